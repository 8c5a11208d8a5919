use super::*;

#[test]
fn completed_is_terminal() {
    let rec = DownloadRecord::builder().status(DownloadStatus::Completed).build();
    assert!(rec.is_terminal());
}

#[test]
fn running_is_not_terminal() {
    let rec = DownloadRecord::builder().status(DownloadStatus::Running).build();
    assert!(!rec.is_terminal());
}
