//! 请求校验模块
//!
//! 校验规则：
//! - subject_id 非空
//! - 记录列表非空，模板载荷非空，质量分在 [0, 1]
//! - 设备列表非空，device_id 非空且唯一

use std::collections::HashSet;

use contracts::{DispatchError, DispatchRequest};

/// 校验 DispatchRequest
///
/// 返回第一个遇到的错误，或 Ok(())。任何错误都意味着没有适配器会被调用。
pub fn validate_request(request: &DispatchRequest) -> Result<(), DispatchError> {
    validate_subject(request)?;
    validate_records(request)?;
    validate_devices(request)?;
    Ok(())
}

fn validate_subject(request: &DispatchRequest) -> Result<(), DispatchError> {
    if request.subject_id.as_str().trim().is_empty() {
        return Err(DispatchError::validation(
            "subject_id",
            "subject id must not be empty",
        ));
    }
    Ok(())
}

/// 校验记录列表
fn validate_records(request: &DispatchRequest) -> Result<(), DispatchError> {
    if request.records.is_empty() {
        return Err(DispatchError::validation(
            "records",
            "at least one biometric record is required",
        ));
    }

    for record in &request.records {
        if !record.is_dispatchable() {
            return Err(DispatchError::validation(
                format!("records[record_id={}].template", record.record_id),
                "template payload must not be empty",
            ));
        }
        if !(0.0..=1.0).contains(&record.quality) {
            return Err(DispatchError::validation(
                format!("records[record_id={}].quality", record.record_id),
                format!("quality must be within [0, 1], got {}", record.quality),
            ));
        }
    }
    Ok(())
}

/// 校验设备列表 (device_id 唯一)
fn validate_devices(request: &DispatchRequest) -> Result<(), DispatchError> {
    if request.devices.is_empty() {
        return Err(DispatchError::validation(
            "devices",
            "at least one target device is required",
        ));
    }

    let mut seen = HashSet::new();
    for device in &request.devices {
        if device.id.as_str().trim().is_empty() {
            return Err(DispatchError::validation("devices[].id", "device id must not be empty"));
        }
        if !seen.insert(device.id.clone()) {
            return Err(DispatchError::validation(
                format!("devices[id={}]", device.id),
                "duplicate device id",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;
    use contracts::{BiometricKind, BiometricRecord, DeviceDescriptor};

    fn record(template: &'static [u8], quality: f32) -> BiometricRecord {
        BiometricRecord {
            record_id: "r1".to_string(),
            subject_id: "42".into(),
            kind: BiometricKind::Face,
            template: Bytes::from_static(template),
            quality,
            template_version: "v1".to_string(),
            captured_at: Utc::now(),
            algorithm_version: "a1".to_string(),
        }
    }

    fn valid_request() -> DispatchRequest {
        DispatchRequest::new(
            "42",
            vec![record(b"\x01", 0.9)],
            vec![DeviceDescriptor::new("d1", "C1", "face_terminal", "acme")],
        )
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_request(&valid_request()).is_ok());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let mut request = valid_request();
        request.subject_id = "".into();
        let err = validate_request(&request).unwrap_err();
        assert!(matches!(err, DispatchError::Validation { field, .. } if field == "subject_id"));
    }

    #[test]
    fn test_empty_record_list_rejected() {
        let mut request = valid_request();
        request.records.clear();
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_empty_template_rejected() {
        let mut request = valid_request();
        request.records.push(record(b"", 0.9));
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("template"));
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let mut request = valid_request();
        request.records.push(record(b"\x01", 1.5));
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn test_empty_device_list_rejected() {
        let mut request = valid_request();
        request.devices.clear();
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_duplicate_device_ids_rejected() {
        let mut request = valid_request();
        request
            .devices
            .push(DeviceDescriptor::new("d1", "C2", "iris_gate", "acme"));
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
