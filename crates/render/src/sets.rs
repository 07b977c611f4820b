use model::{Flags, Permissions};

use crate::style::Style;
use crate::tokens::{flag_tokens, join, permission_tokens};

/// Formats a permission set on its own.
///
/// Symbolic output is the fixed 14-character run, Samba output pipe-joins
/// the abbreviations and icacls output is a parenthesised comma list.
pub fn render_permissions(permissions: Permissions, style: Style) -> String {
    match style {
        Style::Symbolic => permissions.to_symbolic(),
        Style::Samba => join(permission_tokens(permissions), "|"),
        Style::Icacls => format!("({})", join(permission_tokens(permissions), ",")),
    }
}

/// Formats a flag set on its own.
///
/// Symbolic output is the fixed 7-character run; Samba pipe-joins the
/// abbreviations and icacls wraps each one in parentheses.
pub fn render_flags(flags: Flags, style: Style) -> String {
    match style {
        Style::Symbolic => flags.to_symbolic(),
        Style::Samba => join(flag_tokens(flags), "|"),
        Style::Icacls => flag_tokens(flags).map(|token| format!("({token})")).collect(),
    }
}
