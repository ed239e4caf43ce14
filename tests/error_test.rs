use std::io;

use scaffold::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ProviderAmbiguityError { group: "CI" };
    assert_eq!(err.to_string(), "scaffold CI already defined, please check configuration");

    let err = Error::ProviderMissingError { group: "VCS" };
    assert_eq!(err.to_string(), "no VCS configured");

    let err = Error::RemoteOperationError("failed to create repository, 422".to_string());
    assert_eq!(err.to_string(), "failed to create repository, 422");
}

#[test]
fn test_git_error_shows_message() {
    let err: Error = git2::Error::from_str("authentication required").into();
    assert_eq!(err.to_string(), "authentication required");
}
