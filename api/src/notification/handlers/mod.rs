pub mod send_sms;
