//! booking notification relay http service
pub mod dispatcher;
pub mod handlers;
pub mod normalize;
pub mod resolver;

use actix_web::{error, web, HttpRequest, Responder};
use common::error_code::{ApiCommonError, ApiError};
use tracing::debug;

use crate::utils::respond::{gen_extra_respond, generate_error_respond};
use crate::utils::AppState;
use normalize::SendSmsRequest;

/// every deployment variant posts to one of these
pub const SEND_PATHS: [&str; 3] = ["/sms", "/send", "/reserve"];

/**
 * @api {post} /sms 예약 알림 문자 발송
 * @apiVersion 0.1.0
 * @apiName SendSms
 * @apiGroup Notification
 * @apiBody {String} [site]      현장명, 본문에 [현장] 으로 표기
 * @apiBody {String} vd          방문 날짜 2025-11-06
 * @apiBody {String} [vtLabel]   방문 시간 10:00 ~ 11:00
 * @apiBody {String} name        고객 이름
 * @apiBody {String} phone       고객 연락처, 본문 표기용
 * @apiBody {String|String[]} [sp]  수신자(관리자) 번호, adminPhone 도 허용, 쉼표 구분 가능
 * @apiBody {String} [sender]    발신번호 지정, from 도 허용 (fixed_sender 정책, sender_allow_list 에 있을 때만)
 * @apiBody {String} [memo]      메모
 * @apiExample {curl} Example usage:
 *   curl -X POST http://127.0.0.1:8080/sms -H "Content-Type: application/json" -d
 *  '{"site":"보라매","vd":"2025-11-06","vtLabel":"10:00 ~ 11:00","name":"홍길동","phone":"01012341234","sp":"01022223333"}'
 * @apiSuccess {bool} ok                 true
 * @apiSuccess {object} result           vendor raw response (list for several recipients)
 * @apiSuccess {string} from_used        sender actually used
 * @apiSuccess {string[]} to             recipients
 * @apiSuccess {bool} registered_hit     sender came from the approved sender registry
 * @apiError {bool} ok                   false
 * @apiError {string=missing_field,malformed_phone,request_param_invalid,sender_not_approved,sender_not_allowed,vendor_rejected,vendor_unreachable} error
 * @apiError {number} [status]           vendor http status
 * @apiError {object} [detail]           vendor error body, verbatim
 */
#[tracing::instrument(skip_all, fields(trace_id = common::log::generate_trace_id()))]
async fn send_sms(
    state: web::Data<AppState>,
    request_data: web::Json<SendSmsRequest>,
) -> impl Responder {
    debug!("{}", serde_json::to_string(&request_data.0).unwrap_or_default());
    gen_extra_respond(handlers::send_sms::req(&state, request_data.into_inner()).await)
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let api_err: ApiError = ApiCommonError::RequestParamInvalid(err.to_string()).into();
    let respond = generate_error_respond(&api_err);
    error::InternalError::from_response(err, respond).into()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));
    for path in SEND_PATHS {
        cfg.service(web::resource(path).route(web::post().to(send_sms)));
    }
}
