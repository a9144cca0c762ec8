use owlet::http::request::{Method, Request, Version};

#[test]
fn test_method_parse_case_insensitive() {
    assert_eq!(Method::parse("GET"), Some(Method::Get));
    assert_eq!(Method::parse("get"), Some(Method::Get));
    assert_eq!(Method::parse("Post"), Some(Method::Post));
    assert_eq!(Method::parse("HEAD"), Some(Method::Head));
    assert_eq!(Method::parse("PUT"), None);
    assert_eq!(Method::parse("DELETE"), None);
    assert_eq!(Method::parse(""), None);
}

#[test]
fn test_version_ordering() {
    assert!(Version::HTTP_09 < Version::HTTP_10);
    assert!(Version::HTTP_10 < Version::HTTP_11);
    assert!(Version::HTTP_11 < Version { major: 2, minor: 0 });
    assert!(Version { major: 1, minor: 2 } > Version::HTTP_11);
}

#[test]
fn test_version_display_and_legacy() {
    assert_eq!(Version::HTTP_11.to_string(), "HTTP/1.1");
    assert_eq!(Version::HTTP_09.to_string(), "HTTP/0.9");
    assert!(Version::HTTP_09.is_legacy());
    assert!(!Version::HTTP_10.is_legacy());
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let mut req = Request::new(Method::Get, "/".to_string(), Version::HTTP_11);
    req.headers
        .insert("content-type".to_string(), "application/json".to_string());

    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
    assert_eq!(req.header("accept"), None);
}

#[test]
fn test_argument_returns_first_value() {
    let mut req = Request::new(Method::Get, "/".to_string(), Version::HTTP_11);
    req.arguments
        .insert("q".to_string(), vec!["one".to_string(), "two".to_string()]);

    assert_eq!(req.argument("q"), Some("one"));
    assert_eq!(req.argument("missing"), None);
}

#[test]
fn test_cookie_lookup() {
    let mut req = Request::new(Method::Get, "/".to_string(), Version::HTTP_11);
    req.cookies.insert("sid".to_string(), "abc".to_string());
    assert_eq!(req.cookie("sid"), Some("abc"));
    assert_eq!(req.cookie("other"), None);
}
