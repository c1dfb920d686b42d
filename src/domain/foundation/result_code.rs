//! Platform result codes.
//!
//! Every community endpoint answers with a numeric `success` field. The
//! values form a closed enumeration; anything we do not know about is kept as
//! `Unrecognized` so the raw code is never lost.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result code returned by the platform for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ResultCode {
    Ok,
    Fail,
    NoConnection,
    InvalidPassword,
    LoggedInElsewhere,
    InvalidParam,
    FileNotFound,
    Busy,
    InvalidState,
    InvalidName,
    DuplicateName,
    AccessDenied,
    Timeout,
    Banned,
    AccountNotFound,
    InvalidAccountId,
    ServiceUnavailable,
    NotLoggedOn,
    Pending,
    InsufficientPrivilege,
    LimitExceeded,
    Revoked,
    Expired,
    DuplicateRequest,
    AlreadyOwned,
    LogonSessionReplaced,
    AccountDisabled,
    AccountLogonDenied,
    InvalidLoginAuthCode,
    RateLimitExceeded,
    AccountLoginDeniedNeedTwoFactor,
    TwoFactorCodeMismatch,
    Unrecognized(i32),
}

impl ResultCode {
    /// Maps a raw numeric code onto the enumeration.
    pub fn from_code(code: i32) -> Self {
        use ResultCode::*;
        match code {
            1 => Ok,
            2 => Fail,
            3 => NoConnection,
            5 => InvalidPassword,
            6 => LoggedInElsewhere,
            8 => InvalidParam,
            9 => FileNotFound,
            10 => Busy,
            11 => InvalidState,
            12 => InvalidName,
            14 => DuplicateName,
            15 => AccessDenied,
            16 => Timeout,
            17 => Banned,
            18 => AccountNotFound,
            19 => InvalidAccountId,
            20 => ServiceUnavailable,
            21 => NotLoggedOn,
            22 => Pending,
            24 => InsufficientPrivilege,
            25 => LimitExceeded,
            26 => Revoked,
            27 => Expired,
            29 => DuplicateRequest,
            30 => AlreadyOwned,
            34 => LogonSessionReplaced,
            43 => AccountDisabled,
            63 => AccountLogonDenied,
            65 => InvalidLoginAuthCode,
            84 => RateLimitExceeded,
            85 => AccountLoginDeniedNeedTwoFactor,
            88 => TwoFactorCodeMismatch,
            other => Unrecognized(other),
        }
    }

    /// Returns the raw numeric code.
    pub fn code(&self) -> i32 {
        use ResultCode::*;
        match self {
            Ok => 1,
            Fail => 2,
            NoConnection => 3,
            InvalidPassword => 5,
            LoggedInElsewhere => 6,
            InvalidParam => 8,
            FileNotFound => 9,
            Busy => 10,
            InvalidState => 11,
            InvalidName => 12,
            DuplicateName => 14,
            AccessDenied => 15,
            Timeout => 16,
            Banned => 17,
            AccountNotFound => 18,
            InvalidAccountId => 19,
            ServiceUnavailable => 20,
            NotLoggedOn => 21,
            Pending => 22,
            InsufficientPrivilege => 24,
            LimitExceeded => 25,
            Revoked => 26,
            Expired => 27,
            DuplicateRequest => 29,
            AlreadyOwned => 30,
            LogonSessionReplaced => 34,
            AccountDisabled => 43,
            AccountLogonDenied => 63,
            InvalidLoginAuthCode => 65,
            RateLimitExceeded => 84,
            AccountLoginDeniedNeedTwoFactor => 85,
            TwoFactorCodeMismatch => 88,
            Unrecognized(code) => *code,
        }
    }

    /// Human-readable reason for the code.
    pub fn reason(&self) -> &'static str {
        use ResultCode::*;
        match self {
            Ok => "Success",
            Fail => "Generic failure",
            NoConnection => "No connection to the platform",
            InvalidPassword => "Password or ticket is invalid",
            LoggedInElsewhere => "Account is logged in elsewhere",
            InvalidParam => "A request parameter is invalid",
            FileNotFound => "File was not found",
            Busy => "Called method is busy, no action taken",
            InvalidState => "Called object was in an invalid state",
            InvalidName => "Name is invalid",
            DuplicateName => "Name is not unique",
            AccessDenied => "Access is denied",
            Timeout => "Operation timed out",
            Banned => "Account is banned",
            AccountNotFound => "Account was not found",
            InvalidAccountId => "Account id is invalid",
            ServiceUnavailable => "Requested service is currently unavailable",
            NotLoggedOn => "User is not logged on",
            Pending => "Request is pending",
            InsufficientPrivilege => "Insufficient privilege",
            LimitExceeded => "Too much of a good thing",
            Revoked => "Access has been revoked",
            Expired => "License or guest pass has expired",
            DuplicateRequest => "Request is a duplicate and the action already occurred",
            AlreadyOwned => "Item is already owned",
            LogonSessionReplaced => "Logon session was replaced by a newer one",
            AccountDisabled => "Account is disabled",
            AccountLogonDenied => "Logon denied, guard code required",
            InvalidLoginAuthCode => "Guard code is invalid",
            RateLimitExceeded => "Rate limit exceeded",
            AccountLoginDeniedNeedTwoFactor => "Logon denied, two-factor code required",
            TwoFactorCodeMismatch => "Two-factor code mismatch",
            Unrecognized(_) => "Unrecognized result code",
        }
    }

    /// True only for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, ResultCode::Ok)
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason(), self.code())
    }
}
