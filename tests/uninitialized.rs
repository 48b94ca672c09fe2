//! Logging through the macros before `init` is a usage error

#[test]
#[should_panic(expected = "before splitlog::init")]
fn test_logging_before_init_panics() {
    splitlog::info!("too early");
}

#[test]
fn test_toggles_before_init_report_not_initialized() {
    assert!(matches!(
        splitlog::set_console_enabled(true),
        Err(splitlog::Error::NotInitialized)
    ));
    assert!(matches!(
        splitlog::set_max_file_size_bytes(1024),
        Err(splitlog::Error::NotInitialized)
    ));
}
