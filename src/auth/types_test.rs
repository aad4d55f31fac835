use super::*;
use crate::auth::fixtures::{admin, data_entry};

// =============================================================
// Role / Privilege
// =============================================================

#[test]
fn role_serializes_to_api_strings() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    assert_eq!(serde_json::to_string(&Role::DataEntry).unwrap(), "\"dataEntry\"");
}

#[test]
fn role_rejects_unknown_string() {
    assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
}

#[test]
fn privilege_parses_known_names() {
    for p in Privilege::ALL {
        assert_eq!(p.as_str().parse::<Privilege>().unwrap(), p);
    }
}

#[test]
fn privilege_parse_unknown_is_error() {
    let err = "seasons".parse::<Privilege>().unwrap_err();
    assert_eq!(err, UnknownPrivilege("seasons".into()));
}

#[test]
fn privileges_granted_preserves_menu_order() {
    let p = Privileges::default().with(Privilege::Blogs).with(Privilege::Categories);
    let held: Vec<_> = p.granted().collect();
    assert_eq!(held, vec![Privilege::Categories, Privilege::Blogs]);
}

// =============================================================
// User decoding
// =============================================================

#[test]
fn user_decodes_api_shape_with_mongo_id() {
    let json = r#"{
        "_id": "64f0c0ffee",
        "email": "ops@hop4deals.test",
        "role": "dataEntry",
        "privileges": { "deals": true, "brands": false },
        "isActive": true,
        "createdAt": "2024-03-01T12:00:00.000Z"
    }"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.id, "64f0c0ffee");
    assert_eq!(user.role, Role::DataEntry);
    assert!(user.privileges.deals);
    assert!(!user.privileges.categories);
    assert!(user.created_at.is_some());
}

#[test]
fn user_without_privileges_defaults_to_none_granted() {
    let json = r#"{ "id": "a1", "email": "root@hop4deals.test", "role": "admin" }"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.privileges, Privileges::default());
    assert!(user.is_active);
    assert_eq!(user.created_at, None);
}

#[test]
fn user_serializes_camel_case() {
    let value = serde_json::to_value(data_entry(Privileges::default())).unwrap();
    assert!(value.get("isActive").is_some());
    assert!(value.get("is_active").is_none());
    assert!(value.get("createdAt").is_none());
}

// =============================================================
// has_privilege
// =============================================================

#[test]
fn admin_has_every_privilege_even_with_empty_map() {
    let user = admin();
    for p in Privilege::ALL {
        assert!(user.has_privilege(p));
    }
    assert!(user.has_privilege_named("seasons"));
    assert!(user.has_privilege_named(""));
}

#[test]
fn data_entry_privilege_is_exactly_the_flag() {
    let user = data_entry(Privileges::default().with(Privilege::Deals));
    for p in Privilege::ALL {
        assert_eq!(user.has_privilege(p), user.privileges.get(p));
    }
    assert!(user.has_privilege_named("deals"));
    assert!(!user.has_privilege_named("brands"));
    assert!(!user.has_privilege_named("seasons"));
}

// =============================================================
// Credentials
// =============================================================

#[test]
fn credentials_debug_redacts_password() {
    let creds = Credentials::new("a@b.test", "hunter2");
    let debug = format!("{creds:?}");
    assert!(debug.contains("a@b.test"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn credentials_serialize_for_login_body() {
    let value = serde_json::to_value(Credentials::new("a@b.test", "pw")).unwrap();
    assert_eq!(value, serde_json::json!({ "email": "a@b.test", "password": "pw" }));
}
