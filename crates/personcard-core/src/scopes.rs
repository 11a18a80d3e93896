//! Permission scopes required by each directory call.
//!
//! Within one list the scopes are alternatives; any one of them grants
//! access. The first entry is the least privileged and is the one consent
//! is requested for.

/// Reading another user's directory object, manager chain and reports.
pub const USER_READ_SCOPES: &[&str] = &[
  "User.ReadBasic.All",
  "User.Read.All",
  "Directory.Read.All",
  "User.ReadWrite.All",
  "Directory.ReadWrite.All",
];

pub const PEOPLE_SCOPES: &[&str] = &["People.Read.All"];

pub const MAIL_SCOPES: &[&str] = &["Mail.ReadBasic", "Mail.Read", "Mail.ReadWrite"];

pub const FILES_SCOPES: &[&str] = &["Sites.Read.All"];

/// The beta extended profile endpoint.
pub const PROFILE_SCOPES: &[&str] = &["User.Read.All", "User.ReadBasic.All"];

pub const CHAT_CREATE_SCOPES: &[&str] = &["Chat.Create", "Chat.ReadWrite"];

pub const CHAT_MESSAGE_SCOPES: &[&str] = &["ChatMessage.Send", "Chat.ReadWrite"];
