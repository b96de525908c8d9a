pub mod notification;
pub mod phone;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How the sender and recipient of a notification are chosen.
///
/// Selected once in configuration, never per request.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SendPolicy {
    /// from = configured default sender, to = caller supplied recipient(s)
    FixedSender,
    /// from = to = configured administrator number
    FixedAdmin,
    /// from = recipient when it is an approved sender identity, else the default
    VerifiedSender,
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self::VerifiedSender
    }
}

impl SendPolicy {
    pub fn requires_recipient(&self) -> bool {
        !matches!(self, Self::FixedAdmin)
    }
}

//carrier byte accounting for a single short message
pub const SMS_MAX_BYTES: usize = 90;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum MessageType {
    Sms,
    Lms,
}

impl MessageType {
    /// SMS when the text fits one short message, ascii counts one byte and
    /// everything else two.
    pub fn for_text(text: &str) -> Self {
        let bytes: usize = text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
        if bytes <= SMS_MAX_BYTES {
            Self::Sms
        } else {
            Self::Lms
        }
    }
}
