use sssd_config::{Config, ConfigError, Domain, Schema, Value};
use std::path::Path;
use std::sync::Arc;

fn new_config() -> Config {
    let mut config = Config::new(Arc::new(Schema::bundled().unwrap()));
    config.new_config().unwrap();
    config
}

fn imported() -> Config {
    let mut config = Config::new(Arc::new(Schema::bundled().unwrap()));
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/testconfigs/sssd-valid.conf");
    config.import_config(path).unwrap();
    config
}

/// Test creating a local domain and reading an option back
#[test]
fn test_new_local_domain() {
    let config = new_config();
    let mut local = config.new_domain("LOCAL").unwrap();
    local.add_provider("local", "id").unwrap();
    local.set_option("debug_level", Value::from("1")).unwrap();
    assert_eq!(local.get_option("debug_level").unwrap(), Value::Integer(1));
}

/// Test that a subtype can only be filled once
#[test]
fn test_subtype_in_use() {
    let config = new_config();
    let mut domain = config.new_domain("LDAP").unwrap();
    domain.add_provider("ldap", "id").unwrap();
    assert!(matches!(
        domain.add_provider("ldap", "id"),
        Err(ConfigError::ProviderSubtypeInUse { .. })
    ));
}

/// Test that removing a provider drops its options and their values
#[test]
fn test_remove_provider_drops_values() {
    let config = new_config();
    let mut domain = config.new_domain("KRB").unwrap();
    domain.add_provider("local", "id").unwrap();
    domain.add_provider("krb5", "auth").unwrap();
    assert!(domain.list_options().contains_key("krb5_realm"));
    domain.set_option("krb5_realm", Value::from("EXAMPLE.COM")).unwrap();
    domain.set_option("default_shell", Value::from("/bin/zsh")).unwrap();

    domain.remove_provider("auth");
    assert!(!domain.list_options().contains_key("krb5_realm"));
    assert!(!domain.get_all_options().contains_key("krb5_realm"));
    assert_eq!(domain.get_option("default_shell").unwrap(), Value::from("/bin/zsh"));
}

/// Test that a cleared option without a default is gone
#[test]
fn test_cleared_option_without_default() {
    let config = new_config();
    let mut domain = config.new_domain("LOCAL").unwrap();
    domain.set_option("max_id", Value::from(10000)).unwrap();
    domain.set_option("max_id", None).unwrap();
    assert!(matches!(
        domain.get_option("max_id"),
        Err(ConfigError::NoOption { .. })
    ));
}

/// Test the service lifecycle through the façade
#[test]
fn test_service_lifecycle() {
    let mut config = new_config();
    assert_eq!(config.list_services().unwrap(), ["sssd", "nss", "pam"]);

    assert!(matches!(config.get_service("dp"), Err(ConfigError::NoService { .. })));
    assert!(matches!(
        config.get_service("nosuchservice"),
        Err(ConfigError::NoService { .. })
    ));
    assert!(matches!(
        config.new_service("nosuchservice"),
        Err(ConfigError::ServiceNotRecognized { .. })
    ));
    assert!(matches!(
        config.new_service("nss"),
        Err(ConfigError::ServiceAlreadyExists { .. })
    ));

    let mut dp = config.new_service("dp").unwrap();
    // not part of the document until saved
    assert!(!config.list_services().unwrap().contains(&"dp".to_string()));
    dp.set_option("debug_level", Value::from(2)).unwrap();
    config.save_service(&dp).unwrap();
    assert_eq!(config.list_services().unwrap(), ["sssd", "nss", "pam", "dp"]);
    assert_eq!(config.get("dp", "debug_level").unwrap(), Some("2"));

    config.delete_service("dp").unwrap();
    config.delete_service("dp").unwrap();
    assert!(!config.has_section("dp").unwrap());
}

/// Test that deleting and recreating a service restores defaults
#[test]
fn test_recreate_service() {
    let mut config = new_config();
    config.delete_service("sssd").unwrap();
    let sssd = config.new_service("sssd").unwrap();
    assert_eq!(sssd.get_option("services").unwrap(), Value::from(vec!["nss", "pam"]));
    config.save_service(&sssd).unwrap();
    assert!(config.list_services().unwrap().contains(&"sssd".to_string()));
}

/// Test that saving a service only rewrites what changed
#[test]
fn test_save_service_updates_in_place() {
    let mut config = imported();
    let mut sssd = config.get_service("sssd").unwrap();
    sssd.set_option("services", Value::from(vec!["nss", "pam", "sudo"])).unwrap();
    sssd.remove_option("reconnection_retries");
    config.save_service(&sssd).unwrap();

    insta::assert_snapshot!(
        config.serialize().unwrap().split("[domain/PROXY]").next().unwrap_or_default().trim_end(),
        @r"
    # SSSD configuration covering every bundled provider backend

    [nss]
    filter_groups = root
    filter_users = root
    reconnection_retries = 3

    [sssd]
    config_file_version = 2
    services = nss, pam, sudo
    domains = IPA, LOCAL   ; active domains
    "
    );
}

/// Test the active/inactive partition of an imported document
#[test]
fn test_domain_partition() {
    let config = imported();
    assert_eq!(config.list_domains().unwrap(), ["PROXY", "IPA", "LOCAL", "LDAP"]);
    assert_eq!(config.list_active_domains().unwrap(), ["IPA", "LOCAL"]);
    assert_eq!(config.list_inactive_domains().unwrap(), ["PROXY", "LDAP"]);
    assert!(config.get_domain("IPA").unwrap().is_active());
    assert!(!config.get_domain("PROXY").unwrap().is_active());
    assert!(matches!(
        config.get_domain("nosuchdomain"),
        Err(ConfigError::NoDomain { .. })
    ));
}

/// Test that new domains are not persisted until saved
#[test]
fn test_new_domain_is_detached() {
    let mut config = imported();
    assert!(matches!(
        config.new_domain("LDAP"),
        Err(ConfigError::DomainAlreadyExists { .. })
    ));

    let mut domain = config.new_domain("example.com").unwrap();
    assert!(!config.list_domains().unwrap().contains(&"example.com".to_string()));

    domain.add_provider("ldap", "id").unwrap();
    domain.set_option("ldap_uri", Value::from("ldap://ldap.example.com")).unwrap();
    domain.set_active(true);
    config.save_domain(&domain).unwrap();

    assert!(config.list_domains().unwrap().contains(&"example.com".to_string()));
    assert_eq!(
        config.list_active_domains().unwrap(),
        ["IPA", "LOCAL", "example.com"]
    );
    assert_eq!(
        config.get("domain/example.com", "ldap_uri").unwrap(),
        Some("ldap://ldap.example.com")
    );
}

/// Test that deleting a domain also removes it from the active list
#[test]
fn test_delete_domain() {
    let mut config = imported();
    config.delete_domain("IPA").unwrap();
    assert!(!config.list_domains().unwrap().contains(&"IPA".to_string()));
    assert_eq!(config.list_active_domains().unwrap(), ["LOCAL"]);
    assert_eq!(config.get("sssd", "domains").unwrap(), Some("LOCAL"));

    config.delete_domain("IPA").unwrap();
    config.delete_domain("LOCAL").unwrap();
    assert!(!config.has_option("sssd", "domains").unwrap());
}

/// Test deactivating and reactivating an existing domain
#[test]
fn test_save_domain_reconciles_membership() {
    let mut config = imported();
    let mut ldap = config.get_domain("LDAP").unwrap();
    ldap.set_active(true);
    config.save_domain(&ldap).unwrap();
    assert_eq!(config.get("sssd", "domains").unwrap(), Some("IPA, LOCAL, LDAP"));

    let mut ipa = config.get_domain("IPA").unwrap();
    ipa.set_active(false);
    config.save_domain(&ipa).unwrap();
    assert_eq!(config.list_active_domains().unwrap(), ["LOCAL", "LDAP"]);
}

/// Test replacing a provider of an imported domain
#[test]
fn test_modify_existing_domain() {
    let mut config = imported();
    let mut ldap = config.get_domain("LDAP").unwrap();
    ldap.set_option("debug_level", Value::from(3)).unwrap();
    ldap.remove_provider("auth");
    ldap.add_provider("krb5", "auth").unwrap();
    ldap.set_option("krb5_realm", Value::from("EXAMPLE.COM")).unwrap();
    config.save_domain(&ldap).unwrap();

    assert_eq!(config.get("domain/LDAP", "auth_provider").unwrap(), Some("krb5"));
    assert_eq!(config.get("domain/LDAP", "krb5_realm").unwrap(), Some("EXAMPLE.COM"));
    // ldap globals stay while the ldap id provider remains
    assert_eq!(
        config.get("domain/LDAP", "ldap_uri").unwrap(),
        Some("ldap://ldap.example.com")
    );

    let reread = config.get_domain("LDAP").unwrap();
    assert_eq!(reread.get_option("auth_provider").unwrap(), Value::from("krb5"));
}

/// Test that save refuses an entity missing a required option
#[test]
fn test_save_requires_required_options() {
    let mut config = new_config();
    let domain = config.new_domain("PROXY").unwrap();
    assert!(matches!(
        config.save_domain(&domain),
        Err(ConfigError::MissingRequiredOption { ref option, .. }) if option == "id_provider"
    ));

    let mut domain = domain;
    domain.add_provider("proxy", "id").unwrap();
    assert!(matches!(
        config.save_domain(&domain),
        Err(ConfigError::MissingRequiredOption { ref option, .. }) if option == "proxy_lib_name"
    ));
    domain.set_option("proxy_lib_name", Value::from("files")).unwrap();
    config.save_domain(&domain).unwrap();
    assert!(config.has_section("domain/PROXY").unwrap());
}

/// Test that entities from another schema instance are rejected
#[test]
fn test_foreign_schema_is_rejected() {
    let mut config = new_config();
    let foreign = Domain::new("LOCAL", Arc::new(Schema::bundled().unwrap()));
    assert!(matches!(
        config.save_domain(&foreign),
        Err(ConfigError::SchemaMismatch { .. })
    ));
}

/// Test that option values which would change the file on re-import are refused
#[test]
fn test_values_must_read_back_unchanged() {
    let mut config = imported();
    let mut nss = config.get_service("nss").unwrap();
    assert!(matches!(
        nss.set_option("command", Value::from("/bin/true\n[evil]")),
        Err(ConfigError::InvalidValueType(_))
    ));
    assert!(matches!(
        nss.set_option("filter_users", Value::from(vec!["root", "evil\r\nx = 1"])),
        Err(ConfigError::InvalidValueType(_))
    ));

    let mut sssd = config.get_service("sssd").unwrap();
    assert!(matches!(
        sssd.set_option("full_name_format", Value::from("%1$s ;%2$s")),
        Err(ConfigError::InvalidValueType(_))
    ));
    sssd.set_option("full_name_format", Value::from("%1$s@%2$s")).unwrap();
    config.save_service(&nss).unwrap();
    config.save_service(&sssd).unwrap();

    let mut reread = Config::new(config.schema().clone());
    reread.import_config_str(&config.serialize().unwrap()).unwrap();
    assert_eq!(reread.sections().unwrap(), config.sections().unwrap());
    assert_eq!(
        reread.get_service("sssd").unwrap().get_option("full_name_format").unwrap(),
        Value::from("%1$s@%2$s")
    );
}

/// Test that domain names which cannot be written back are refused
#[test]
fn test_invalid_domain_names() {
    let mut config = new_config();
    for name in ["", "a, b", "x]y", "LOCAL\n[evil]", " padded"] {
        assert!(
            matches!(config.new_domain(name), Err(ConfigError::InvalidDomainName { .. })),
            "{name:?}"
        );
    }

    let mut bypass = Domain::new("a, b", config.schema().clone());
    bypass.add_provider("local", "id").unwrap();
    bypass.set_active(true);
    assert!(matches!(
        config.save_domain(&bypass),
        Err(ConfigError::InvalidDomainName { .. })
    ));
    assert!(config.list_domains().unwrap().is_empty());
    assert!(!config.has_option("sssd", "domains").unwrap());

    let mut local = config.new_domain("LOCAL").unwrap();
    local.add_provider("local", "id").unwrap();
    local.set_active(true);
    config.save_domain(&local).unwrap();

    let mut reread = Config::new(config.schema().clone());
    reread.import_config_str(&config.serialize().unwrap()).unwrap();
    assert_eq!(reread.list_active_domains().unwrap(), ["LOCAL"]);
}
