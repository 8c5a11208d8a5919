use super::*;

#[test]
fn status_codes_match_error_handling_design() {
    assert_eq!(GatewayFault::ModelUnknown.status_code(), 400);
    assert_eq!(GatewayFault::BadRequest.status_code(), 400);
    assert_eq!(GatewayFault::AuthRequired.status_code(), 401);
    assert_eq!(GatewayFault::SpawnFailed.status_code(), 502);
    assert_eq!(GatewayFault::ReadinessTimeout.status_code(), 502);
    assert_eq!(GatewayFault::BodyTooLarge.status_code(), 413);
    assert_eq!(GatewayFault::Internal.status_code(), 500);
}
