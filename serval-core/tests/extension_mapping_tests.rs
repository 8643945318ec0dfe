use serval_core::serializer::{get_extension, ExtensionMapping, BUILTIN_EXTENSIONS};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_first_access_sees_complete_table() {
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let json = get_extension("application/json");
                let table = ExtensionMapping::global();
                let complete = BUILTIN_EXTENSIONS
                    .iter()
                    .all(|ext| table.content_type(ext).is_some());
                (json, complete)
            })
        })
        .collect();

    for handle in handles {
        let (json, complete) = handle.join().unwrap();
        assert_eq!(json, Some("json"));
        assert!(complete);
    }
}

#[test]
fn test_init_is_idempotent() {
    ExtensionMapping::init();
    ExtensionMapping::init();

    let table = ExtensionMapping::global();
    assert_eq!(table.len(), 4);
    assert_eq!(table.extension("text/xml"), Some("xml"));
    assert_eq!(table.content_type("json"), Some("application/json"));
}

#[test]
fn test_unmapped_content_types() {
    assert_eq!(get_extension("text/plain"), None);
    assert_eq!(get_extension("text/html"), None);
    assert_eq!(get_extension(""), None);
}
