// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request body rewriting: `model` field substitution and `stripParams`
//! deletion, for both JSON and multipart bodies.

use crate::error::ProxyError;
use bytes::Bytes;
use futures::stream;
use mg_core::ModelConfig;
use serde_json::Value;

/// Rewrites a JSON request body in place: substitutes the `model`
/// field (if present and `useModelName` is configured) and deletes
/// every `stripParams` pointer, ignoring pointers that don't resolve.
pub fn rewrite_json(body: &[u8], config: &ModelConfig) -> Result<Bytes, ProxyError> {
    let mut value: Value = serde_json::from_slice(body).map_err(ProxyError::MalformedJson)?;

    if !config.use_model_name.is_empty() {
        if let Some(model) = value.get_mut("model") {
            *model = Value::String(config.use_model_name.clone());
        }
    }

    for pointer in &config.strip_params {
        delete_json_pointer(&mut value, pointer);
    }

    serde_json::to_vec(&value).map(Bytes::from).map_err(ProxyError::MalformedJson)
}

/// Deletes the key or array index named by `pointer` (e.g.
/// `/options/seed`) from `root`. A pointer whose parent doesn't exist,
/// or whose final segment isn't present, is silently ignored.
fn delete_json_pointer(root: &mut Value, pointer: &str) {
    let Some((parent_ptr, key)) = pointer.rsplit_once('/') else {
        return;
    };
    let parent = if parent_ptr.is_empty() { Some(root) } else { root.pointer_mut(parent_ptr) };
    match parent {
        Some(Value::Object(map)) => {
            map.remove(key);
        }
        Some(Value::Array(arr)) => {
            if let Ok(index) = key.parse::<usize>() {
                if index < arr.len() {
                    arr.remove(index);
                }
            }
        }
        _ => {}
    }
}

/// Reconstructs a `multipart/form-data` body field by field, applying
/// the same `model` field substitution as [`rewrite_json`]. Every
/// other field (text or file) is copied through unchanged, preserving
/// its original name, filename, and content type.
pub async fn rewrite_multipart(body: Bytes, boundary: &str, config: &ModelConfig) -> Result<Bytes, ProxyError> {
    let source = stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut parts = multer::Multipart::new(source, boundary);

    let mut out = Vec::new();
    while let Some(mut field) = parts.next_field().await.map_err(|e| ProxyError::MalformedMultipart(e.to_string()))? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| ProxyError::MalformedMultipart(e.to_string()))? {
            data.extend_from_slice(&chunk);
        }

        if name == "model" && !config.use_model_name.is_empty() {
            data = config.use_model_name.clone().into_bytes();
        }

        write_field(&mut out, boundary, &name, file_name.as_deref(), content_type.as_deref(), &data);
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Ok(Bytes::from(out))
}

fn write_field(out: &mut Vec<u8>, boundary: &str, name: &str, file_name: Option<&str>, content_type: Option<&str>, data: &[u8]) {
    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    match file_name {
        Some(file_name) => {
            out.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n").as_bytes());
        }
        None => {
            out.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes());
        }
    }
    if let Some(content_type) = content_type {
        out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
}

#[cfg(test)]
#[path = "body_rewrite_tests.rs"]
mod tests;
