use crate::domain::{AccessType, Role};
use crate::tools::ToolId;
use std::str::FromStr;

/// Accepts `admin`, `ADMIN`, `Admin`.
pub(super) fn parse_role(role: &str) -> Option<Role> {
    Role::from_str(&role.trim().to_ascii_uppercase()).ok()
}

pub(super) fn parse_access_type(access_type: &str) -> Option<AccessType> {
    AccessType::from_str(&access_type.trim().to_ascii_uppercase()).ok()
}

pub(super) fn parse_tool_id(tool_id: &str) -> Option<ToolId> {
    ToolId::from_str(tool_id.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(parse_role("admin"), Some(Role::Admin));
        assert_eq!(parse_role(" USER "), Some(Role::User));
        assert_eq!(parse_access_type("limited"), Some(AccessType::Limited));
        assert_eq!(parse_tool_id("json-formatter"), Some(ToolId::JsonFormatter));
    }

    #[test]
    fn parse_invalid_inputs_return_none() {
        assert!(parse_role("owner").is_none());
        assert!(parse_access_type("sometimes").is_none());
        assert!(parse_tool_id("Base64").is_none());
    }
}
