use url::Url;

const ORIGIN: &str = "http://localhost";

pub fn join_url(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    let parsed_base_url = Url::parse(base_url)?;
    let joined_url = parsed_base_url.join(path)?;
    Ok(joined_url)
}

/// Path component of an absolute or origin-relative URL, without query or fragment.
/// A leading `//` stays part of the path instead of naming a host.
pub fn url_path(url: &str) -> Option<String> {
    let parsed = if url.starts_with('/') {
        Url::parse(&format!("{}{}", ORIGIN, url))
    } else {
        join_url(ORIGIN, url)
    };
    parsed.ok().map(|url| url.path().to_string())
}

/// Normalises a deployment prefix into `""` (served at the root) or `/segment[/...]`
/// with no trailing slash. Accepts a bare path or a full URL.
pub fn normalize_base(base: &str) -> String {
    let base = base.trim();
    let path = match Url::parse(base) {
        Ok(url) if url.has_host() => url.path().to_string(),
        _ => base.to_string(),
    };
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_path_drops_query_and_fragment() {
        assert_eq!(url_path("/post/42?draft=1#top").as_deref(), Some("/post/42"));
        assert_eq!(url_path("https://example.com/create").as_deref(), Some("/create"));
        assert_eq!(url_path("/").as_deref(), Some("/"));
    }

    #[test]
    fn url_path_keeps_double_slash_as_path() {
        assert_eq!(url_path("//create").as_deref(), Some("//create"));
        assert_eq!(url_path("//evil.com/create").as_deref(), Some("//evil.com/create"));
    }

    #[test]
    fn normalize_base_variants() {
        assert_eq!(normalize_base("/"), "");
        assert_eq!(normalize_base(""), "");
        assert_eq!(normalize_base("/blog/"), "/blog");
        assert_eq!(normalize_base("blog"), "/blog");
        assert_eq!(normalize_base("https://example.com/apps/blog/"), "/apps/blog");
    }
}
