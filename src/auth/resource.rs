/// Audience for a full service URL: its scheme and host, without the path.
///
/// # Example
/// ```
/// use tenantctl::auth::resource_from_url;
///
/// assert_eq!(
///     resource_from_url("https://contoso.sharepoint.com/sites/x"),
///     "https://contoso.sharepoint.com"
/// );
/// assert_eq!(
///     resource_from_url("https://contoso.sharepoint.com"),
///     "https://contoso.sharepoint.com"
/// );
/// ```
pub fn resource_from_url(url: &str) -> &str {
    let host_start = url
        .find("://")
        .filter(|&idx| !url[..idx].contains('/'))
        .map(|idx| idx + 3)
        .unwrap_or(0);
    match url[host_start..].find('/') {
        Some(offset) => &url[..host_start + offset],
        None => url,
    }
}
