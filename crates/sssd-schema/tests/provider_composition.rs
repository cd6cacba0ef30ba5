use sssd_schema::{ProviderError, ProviderSet, Schema, effective_options, provider_options};

fn schema() -> Schema {
    Schema::bundled().unwrap()
}

/// Test that every attachment only grows the effective option set
#[test]
fn test_union_is_monotonic() {
    let schema = schema();
    let mut set = ProviderSet::new();
    let mut previous = effective_options(&schema, &set);

    for (backend, subtype) in [("ldap", "id"), ("krb5", "auth"), ("ldap", "chpass"), ("local", "access")] {
        set.attach(&schema, backend, subtype).unwrap();
        let current = effective_options(&schema, &set);
        for name in previous.keys() {
            assert!(current.contains_key(name), "{name} lost after attaching {backend}/{subtype}");
        }
        assert!(current.len() >= previous.len());
        previous = current;
    }
}

/// Test that detaching restores the exact previous option set
#[test]
fn test_detach_removes_exactly_its_options() {
    let schema = schema();
    let mut set = ProviderSet::new();
    set.attach(&schema, "ldap", "id").unwrap();
    let before = effective_options(&schema, &set);

    set.attach(&schema, "krb5", "auth").unwrap();
    let with_krb5 = effective_options(&schema, &set);
    assert!(with_krb5.contains_key("krb5_realm"));
    assert!(with_krb5.contains_key("krb5_ccachedir"));

    set.detach("auth").unwrap();
    let after = effective_options(&schema, &set);
    assert_eq!(
        after.keys().collect::<Vec<_>>(),
        before.keys().collect::<Vec<_>>()
    );
}

/// Test that ldap globals survive while any ldap pair remains attached
#[test]
fn test_backend_globals_follow_last_pair() {
    let schema = schema();
    let mut set = ProviderSet::new();
    set.attach(&schema, "ldap", "id").unwrap();
    set.attach(&schema, "ldap", "auth").unwrap();

    set.detach("id");
    let options = effective_options(&schema, &set);
    assert!(options.contains_key("ldap_uri"));
    assert!(!options.contains_key("ldap_user_object_class"));

    set.detach("auth");
    assert!(!effective_options(&schema, &set).contains_key("ldap_uri"));
}

/// Test the provider catalog error kinds
#[test]
fn test_catalog_errors() {
    let schema = schema();
    let mut set = ProviderSet::new();
    assert!(matches!(
        set.attach(&schema, "nis", "id"),
        Err(ProviderError::NoSuchProvider { .. })
    ));
    assert!(matches!(
        set.attach(&schema, "ldap", "access"),
        Err(ProviderError::NoSuchProviderSubtype { .. })
    ));
    set.attach(&schema, "ldap", "id").unwrap();
    assert!(matches!(
        set.attach(&schema, "ldap", "id"),
        Err(ProviderError::ProviderSubtypeInUse { .. })
    ));
}

/// Test listing a single pair against a whole backend
#[test]
fn test_list_provider_options() {
    let schema = schema();
    let auth = provider_options(&schema, "krb5", Some("auth")).unwrap();
    let names: Vec<_> = auth.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        [
            "krb5_kdcip",
            "krb5_realm",
            "krb5_ccachedir",
            "krb5_ccname_template",
            "krb5_keytab",
            "krb5_validate",
            "krb5_auth_timeout"
        ]
    );

    let chpass = provider_options(&schema, "krb5", Some("chpass")).unwrap();
    let names: Vec<_> = chpass.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        ["krb5_kdcip", "krb5_realm", "krb5_changepw_principal", "krb5_kpasswd"]
    );

    let all = provider_options(&schema, "krb5", None).unwrap();
    assert!(all.contains_key("krb5_kdcip"));
    assert!(all.contains_key("krb5_keytab"));
    assert!(all.contains_key("krb5_kpasswd"));

    // the globals are all an option-less pair exposes
    let access = provider_options(&schema, "krb5", Some("access")).unwrap();
    assert_eq!(access.len(), 2);
    assert_eq!(all.len(), auth.len() + 2);
}
