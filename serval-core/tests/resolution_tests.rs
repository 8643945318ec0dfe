use serval_core::naming::{capitalize, pluralize, singularize};
use serval_core::{PackageStyle, ResolverSettings, ResourceFinder, ResourcePath, SerializerFinder};
use std::collections::HashSet;

fn known(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn test_flat_resolution_targets_singular_name() {
    let finder = ResourceFinder::new("com.acme", "Controller", PackageStyle::Flat);
    let handlers = known(&["com.acme.SessionController", "com.acme.CategoryController"]);

    assert_eq!(
        finder.resolve("sessions", &handlers).unwrap().as_deref(),
        Some("com.acme.SessionController")
    );
    assert_eq!(
        finder.resolve("categories", &handlers).unwrap().as_deref(),
        Some("com.acme.CategoryController")
    );
    assert_eq!(finder.resolve("orders", &handlers).unwrap(), None);
}

#[test]
fn test_alias_wins_over_main() {
    let settings = ResolverSettings::new("com.acme").with_controller_alias("com.acme.override");
    let finder = ResourceFinder::for_controllers(&settings).unwrap();
    let handlers = known(&["com.acme.SessionController", "com.acme.override.SessionController"]);

    assert_eq!(
        finder.resolve("sessions", &handlers).unwrap().as_deref(),
        Some("com.acme.override.SessionController")
    );

    let main_only = known(&["com.acme.SessionController"]);
    assert_eq!(
        finder.resolve("sessions", &main_only).unwrap().as_deref(),
        Some("com.acme.SessionController")
    );
}

#[test]
fn test_style_changes_only_the_namespace() {
    let flat = ResourceFinder::new("com.acme", "Controller", PackageStyle::Flat);
    let nested = ResourceFinder::new("com.acme", "Controller", PackageStyle::Nested);

    for resource in ["sessions", "users", "boxes", "categories"] {
        let flat_id = flat.candidates(resource).unwrap().pop().unwrap();
        let nested_id = nested.candidates(resource).unwrap().pop().unwrap();

        let flat_simple = flat_id.rsplit('.').next().unwrap();
        let nested_simple = nested_id.rsplit('.').next().unwrap();
        assert_eq!(flat_simple, nested_simple);
        assert_eq!(nested_id, format!("com.acme.{}.{}", resource, nested_simple));
    }
}

#[test]
fn test_pluralization_round_trip() {
    for word in ["session", "users", "category", "boxes", "address", "watch", "Wish", "day"] {
        let base = capitalize(&singularize(word)).unwrap();
        let round_trip = capitalize(&singularize(&pluralize(&base))).unwrap();
        assert_eq!(round_trip, base, "round trip of {word}");
    }
}

#[test]
fn test_serializer_custom_then_builtin_then_none() {
    let settings = ResolverSettings::new("com.acme").with_serializer_alias("com.acme.web");
    let serializers = known(&["com.acme.JsonSessionSerializer", "com.acme.web.XmlSessionSerializer"]);

    let json = SerializerFinder::from_settings(&settings, Some("json")).unwrap();
    assert_eq!(
        json.resolve("sessions", &serializers).unwrap().as_deref(),
        Some("com.acme.JsonSessionSerializer")
    );
    assert_eq!(
        json.resolve("users", &serializers).unwrap().as_deref(),
        Some("serval.serializers.JsonSerializer")
    );

    let xml = SerializerFinder::from_settings(&settings, Some("xml")).unwrap();
    assert_eq!(
        xml.resolve("sessions", &serializers).unwrap().as_deref(),
        Some("com.acme.web.XmlSessionSerializer")
    );
    assert_eq!(
        xml.resolve("users", &serializers).unwrap().as_deref(),
        Some("serval.serializers.XmlSerializer")
    );

    let shouted = SerializerFinder::from_settings(&settings, Some("JSON")).unwrap();
    assert_eq!(
        shouted.resolve("users", &serializers).unwrap().as_deref(),
        Some("serval.serializers.JsonSerializer")
    );

    let csv = SerializerFinder::from_settings(&settings, Some("csv")).unwrap();
    assert_eq!(csv.resolve("sessions", &serializers).unwrap(), None);

    let page = SerializerFinder::from_settings(&settings, None).unwrap();
    assert!(page.is_page());
    assert_eq!(
        page.resolve("sessions", &serializers).unwrap().as_deref(),
        Some("serval.serializers.PageSerializer")
    );
}

#[test]
fn test_nested_path_identifiers() {
    let path = ResourcePath::parse("/sessions/1/users/2");
    let chain: Vec<(&str, Option<&str>)> = path
        .chain()
        .iter()
        .map(|segment| (segment.name.as_str(), segment.identifier.as_deref()))
        .collect();

    assert_eq!(chain, vec![("sessions", Some("1")), ("users", Some("2"))]);
    assert_eq!(path.id(), Some("2"));
    assert_eq!(path.id_of("sessions"), Some("1"));
    assert_eq!(path.id_of("orders"), None);
}

#[test]
fn test_collection_and_empty_paths() {
    let collection = ResourcePath::parse("/sessions");
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.resource(), Some("sessions"));
    assert_eq!(collection.id(), None);

    let empty = ResourcePath::parse("");
    assert!(empty.is_empty());
    assert_eq!(empty.id(), None);
    assert_eq!(empty.extension(), None);
    assert_eq!(empty.resource(), None);
}

#[test]
fn test_identifiers_are_opaque() {
    let path = ResourcePath::parse("/users/alice%40example.com/tokens/abc-123.json");
    assert_eq!(path.id_of("user"), Some("alice@example.com"));
    assert_eq!(path.id(), Some("abc-123"));
    assert_eq!(path.extension(), Some("json"));
}
