//! Unit tests for osluc-core

use super::*;

// =============================================================================
// Identity Model Tests
// =============================================================================

#[cfg(test)]
mod identity_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_ref_parts() {
        let id = IdentityRef::new("corp_ldap:alice");
        assert_eq!(id.provider(), "corp_ldap");
        assert_eq!(id.external_id(), Some("alice"));
        assert_eq!(id.to_string(), "corp_ldap:alice");
    }

    #[test]
    fn test_identity_ref_external_id_keeps_later_colons() {
        let id = IdentityRef::new("ldap:uid=alice:extra");
        assert_eq!(id.provider(), "ldap");
        assert_eq!(id.external_id(), Some("uid=alice:extra"));
    }

    #[test]
    fn test_identity_ref_without_separator() {
        let id = IdentityRef::new("orphan");
        assert_eq!(id.provider(), "orphan");
        assert_eq!(id.external_id(), None);
    }

    #[test]
    fn test_identity_ref_prefix_is_plain_string_match() {
        let id = IdentityRef::new("corp_ldap:alice");
        assert!(id.has_prefix("corp_ldap"));
        assert!(id.has_prefix("corp_ldap:"));
        assert!(id.has_prefix("corp"));
        assert!(!id.has_prefix("notset"));
    }

    #[test]
    fn test_sole_identity() {
        let none = User::new("a", vec![]);
        let one = User::new("b", vec!["ldap:b".into()]);
        let two = User::new("c", vec!["ldap:c".into(), "github:c".into()]);

        assert_eq!(none.sole_identity(), None);
        assert_eq!(one.sole_identity(), Some(&IdentityRef::new("ldap:b")));
        assert_eq!(two.sole_identity(), None);
    }

    #[test]
    fn test_user_deserializes_plain_identity_strings() {
        let user: User =
            serde_json::from_str(r#"{"name":"alice","identities":["ldap:alice"]}"#).unwrap();
        assert_eq!(user, User::new("alice", vec!["ldap:alice".into()]));
    }

    #[test]
    fn test_user_without_identities_field() {
        let user: User = serde_json::from_str(r#"{"name":"bob"}"#).unwrap();
        assert!(user.identities.is_empty());
    }
}

// =============================================================================
// Directory Model Tests
// =============================================================================

#[cfg(test)]
mod directory_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deref_aliases_closed_mapping() {
        assert_eq!(DerefAliases::from_config(Some("always")), DerefAliases::Always);
        assert_eq!(DerefAliases::from_config(Some("never")), DerefAliases::Never);
        assert_eq!(DerefAliases::from_config(Some("search")), DerefAliases::Never);
        assert_eq!(DerefAliases::from_config(Some("Always")), DerefAliases::Never);
        assert_eq!(DerefAliases::from_config(None), DerefAliases::Never);
    }

    #[test]
    fn test_entry_attribute_lookup_ignores_case() {
        let entry = DirectoryEntry::new("cn=alice,dc=example,dc=com")
            .with_attr("lastLogon", "133753723630000000")
            .with_attr("sAMAccountName", "alice");

        assert_eq!(entry.attr("lastlogon"), Some("133753723630000000"));
        assert_eq!(entry.attr("SAMACCOUNTNAME"), Some("alice"));
        assert_eq!(entry.attr("accountExpires"), None);
    }

    #[test]
    fn test_entry_attribute_returns_first_value() {
        let entry = DirectoryEntry::new("cn=a")
            .with_attr("cn", "first")
            .with_attr("cn", "second");
        assert_eq!(entry.attr("cn"), Some("first"));
    }
}

// =============================================================================
// Error Tests
// =============================================================================

#[cfg(test)]
mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_fatality() {
        assert!(OslucError::config("missing url").is_fatal());
        assert!(OslucError::directory("search failed").is_fatal());
        assert!(OslucError::internal_error("boom").is_fatal());
        assert!(!OslucError::store("delete failed").is_fatal());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            OslucError::directory("bind failed").to_string(),
            "Directory error: bind failed"
        );
    }
}
