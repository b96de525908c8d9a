//! Request Normalizer: raw inbound fields to a validated NotificationRequest
//!
//! Pure, no I/O. Phone fields are stripped to digits and `82`-prefixed
//! mobile numbers are rewritten to local form before validation.

use common::data_structures::notification::NotificationRequest;
use common::data_structures::phone::PhoneNumber;
use common::data_structures::SendPolicy;
use common::error_code::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Recipient as sent by the page: one number, a comma separated string or
/// a list.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum PhoneField {
    One(String),
    Many(Vec<String>),
}

/// Only a single trailing comma is tolerated, any other empty segment is
/// kept so it fails validation.
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries: Vec<&str> = value.split(',').collect();
    if entries.len() > 1 && entries.last().map_or(false, |last| last.trim().is_empty()) {
        entries.pop();
    }
    entries
}

impl PhoneField {
    /// A blank single value counts as absent.
    fn entries(&self) -> Vec<&str> {
        match self {
            PhoneField::One(value) if value.trim().is_empty() => vec![],
            PhoneField::One(value) => split_entries(value),
            PhoneField::Many(values) => values.iter().flat_map(|v| split_entries(v)).collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsRequest {
    pub site: Option<String>,
    /// visit date
    pub vd: Option<String>,
    /// visit time range label
    pub vt_label: Option<String>,
    pub name: Option<String>,
    /// customer phone, only rendered into the body
    pub phone: Option<String>,
    pub memo: Option<String>,
    /// recipient(s)
    #[serde(alias = "adminPhone")]
    pub sp: Option<PhoneField>,
    #[serde(alias = "from")]
    pub sender: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    non_blank(value).ok_or(ValidationError::MissingField(field))
}

/// Every recipient is validated before anything is returned, one bad
/// entry rejects the whole request. Duplicates are dropped keeping order.
fn parse_recipients(field: Option<&PhoneField>) -> Result<Vec<PhoneNumber>, ValidationError> {
    let mut recipients: Vec<PhoneNumber> = vec![];
    for entry in field.map(PhoneField::entries).unwrap_or_default() {
        let phone = PhoneNumber::parse("sp", entry)?;
        if !recipients.contains(&phone) {
            recipients.push(phone);
        }
    }
    Ok(recipients)
}

/// Body fields, recipients and sender as supplied, each validated, without
/// any policy requirement.
fn parse_fields(request: SendSmsRequest) -> Result<NotificationRequest, ValidationError> {
    let SendSmsRequest {
        site,
        vd,
        vt_label,
        name,
        phone,
        memo,
        sp,
        sender,
    } = request;

    let name = required("name", name)?;
    let visit_date = required("vd", vd)?;
    let customer_phone = PhoneNumber::parse("phone", phone.as_deref().unwrap_or_default())?;
    let recipients = parse_recipients(sp.as_ref())?;
    let sender = match non_blank(sender) {
        Some(raw) => Some(PhoneNumber::parse("sender", &raw)?),
        None => None,
    };

    Ok(NotificationRequest {
        site: non_blank(site),
        visit_date,
        time_label: non_blank(vt_label),
        name,
        customer_phone,
        memo: non_blank(memo),
        recipients,
        sender,
    })
}

pub fn parse(
    request: SendSmsRequest,
    policy: SendPolicy,
) -> Result<NotificationRequest, ValidationError> {
    let mut parsed = parse_fields(request)?;
    if policy.requires_recipient() && parsed.recipients.is_empty() {
        return Err(ValidationError::MissingField("sp"));
    }
    if !policy.requires_recipient() && !parsed.recipients.is_empty() {
        debug!("{} ignores caller recipients {:?}", policy, parsed.recipients);
        parsed.recipients.clear();
    }
    Ok(parsed)
}

/// Dev echo only renders the body, so no recipient is required.
pub fn parse_preview(request: SendSmsRequest) -> Result<NotificationRequest, ValidationError> {
    parse_fields(request)
}
