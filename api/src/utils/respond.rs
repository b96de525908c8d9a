use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use common::error_code::{ApiError, ErrorCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type ApiRes<D, E = ApiError> = Result<D, E>;

/// `{"ok": true, ...data}`
#[derive(Deserialize, Serialize)]
pub struct RelayRespond<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ErrorRespond {
    pub ok: bool,
    pub code: u16,
    /// machine readable error kind
    pub error: String,
    pub message: String,
    /// vendor status and body, verbatim
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub delivered: Option<usize>,
}

impl From<&ApiError> for ErrorRespond {
    fn from(error: &ApiError) -> Self {
        let mut respond = ErrorRespond {
            ok: false,
            code: error.code(),
            error: error.kind().to_string(),
            message: error.to_string(),
            status: None,
            detail: None,
            delivered: None,
        };
        if let ApiError::Dispatch { source, delivered } = error {
            if let common::error_code::DispatchError::Rejected { status, detail } = source {
                respond.status = Some(*status);
                respond.detail = Some(detail.clone());
            }
            if *delivered > 0 {
                respond.delivered = Some(*delivered);
            }
        }
        respond
    }
}

pub fn generate_ok_respond(data: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(RelayRespond { ok: true, data })
}

pub fn generate_error_respond(error: &ApiError) -> HttpResponse {
    debug!("return_error_respond: {}", error);
    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(ErrorRespond::from(error))
}

pub fn gen_extra_respond<D: Serialize>(inner_res: ApiRes<D>) -> HttpResponse {
    match inner_res {
        Ok(data) => generate_ok_respond(data),
        Err(error) => generate_error_respond(&error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error_code::{DispatchError, ValidationError};
    use serde_json::json;

    #[test]
    fn test_error_respond_shape() {
        let error: ApiError = ValidationError::MissingField("name").into();
        assert_eq!(
            serde_json::to_value(ErrorRespond::from(&error)).unwrap(),
            json!({"ok": false, "code": 1001, "error": "missing_field", "message": "name is required"})
        );
    }

    #[test]
    fn test_vendor_rejection_is_verbatim() {
        let error = ApiError::Dispatch {
            source: DispatchError::Rejected {
                status: 400,
                detail: json!({"errorCode": "ValidationError"}),
            },
            delivered: 1,
        };
        let respond = serde_json::to_value(ErrorRespond::from(&error)).unwrap();
        assert_eq!(respond["status"], 400);
        assert_eq!(respond["detail"], json!({"errorCode": "ValidationError"}));
        assert_eq!(respond["delivered"], 1);
        assert_eq!(respond["error"], "vendor_rejected");
    }

    #[test]
    fn test_ok_respond_flattens() {
        let respond = RelayRespond {
            ok: true,
            data: json!({"result": {"groupId": "G1"}}),
        };
        assert_eq!(
            serde_json::to_value(respond).unwrap(),
            json!({"ok": true, "result": {"groupId": "G1"}})
        );
    }
}
