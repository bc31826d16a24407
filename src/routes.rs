use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use anyhow::{anyhow, bail, Result};
use percent_encoding::percent_decode_str;

use crate::util::{normalize_base, url_path};

/// Page-level views a route can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Post,
    Create,
    Edit,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Home => write!(f, "Home"),
            Page::Post => write!(f, "Post"),
            Page::Create => write!(f, "Create post"),
            Page::Edit => write!(f, "Edit post"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub page: Page,
    /// Forward matched named segments to the page.
    pub props: bool,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: "home",
        page: Page::Home,
        props: false,
    },
    Route {
        path: "/post/:id",
        name: "post",
        page: Page::Post,
        props: true,
    },
    Route {
        path: "/create",
        name: "create",
        page: Page::Create,
        props: false,
    },
    Route {
        path: "/post/:id/edit",
        name: "edit",
        page: Page::Edit,
        props: true,
    },
];

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Static(String),
    Param(String),
}

fn parse_pattern(path: &str) -> Result<Vec<Segment>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| anyhow!("route path {:?} must start with '/'", path))?;
    let mut seen = HashSet::new();
    rest.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.strip_prefix(':') {
            Some("") => bail!("route path {:?} has an unnamed parameter", path),
            Some(name) => {
                if !seen.insert(name) {
                    bail!("route path {:?} repeats parameter {:?}", path, name);
                }
                Ok(Segment::Param(name.to_string()))
            }
            None => Ok(Segment::Static(segment.to_string())),
        })
        .collect()
}

/// Splits a request path into segments. One trailing slash is tolerated, empty
/// segments in the middle are kept so that `/post//edit` can't match `:id`.
fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Base prefixes compare case-insensitively, like static segments.
fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let head = path.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        path.get(prefix.len()..)
    } else {
        None
    }
}

#[derive(Debug)]
struct CompiledRoute {
    route: Route,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    fn matches(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(path) {
            match segment {
                Segment::Static(expected) if expected.eq_ignore_ascii_case(value) => {}
                Segment::Param(name) if !value.is_empty() => {
                    let decoded = percent_decode_str(value).decode_utf8().ok()?;
                    params.insert(name.clone(), decoded.into_owned());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

/// Result of resolving a URL against the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    route: Route,
    params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn name(&self) -> &'static str {
        self.route.name
    }

    pub fn page(&self) -> Page {
        self.route.page
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Named segments handed to the page; empty unless the route forwards props.
    pub fn props(&self) -> HashMap<String, String> {
        if self.route.props {
            self.params.clone()
        } else {
            HashMap::new()
        }
    }
}

/// Ordered, immutable route table. Built once at startup and shared read-only.
#[derive(Debug)]
pub struct RouteTable {
    base: String,
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn new(base: &str, routes: &[Route]) -> Result<Self> {
        let mut names = HashSet::new();
        let routes = routes
            .iter()
            .map(|route| {
                if !names.insert(route.name) {
                    bail!("duplicate route name {:?}", route.name);
                }
                Ok(CompiledRoute {
                    route: *route,
                    segments: parse_pattern(route.path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RouteTable {
            base: normalize_base(base),
            routes,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(|compiled| &compiled.route)
    }

    /// Resolves a URL to the first matching route. Query and fragment are ignored;
    /// URLs outside the base prefix never match.
    pub fn resolve(&self, url: &str) -> Option<RouteMatch> {
        let path = url_path(url)?;
        let path = if self.base.is_empty() {
            path.as_str()
        } else {
            match strip_prefix_ignore_case(&path, &self.base)? {
                "" => "/",
                rest if rest.starts_with('/') => rest,
                _ => return None,
            }
        };
        let segments = split_path(path);
        self.routes.iter().find_map(|compiled| {
            compiled.matches(&segments).map(|params| RouteMatch {
                route: compiled.route,
                params,
            })
        })
    }

    /// Builds the base-prefixed URL of a named route.
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        let compiled = self
            .routes
            .iter()
            .find(|compiled| compiled.route.name == name)
            .ok_or_else(|| anyhow!("no route named {:?}", name))?;
        let mut href = self.base.clone();
        for segment in &compiled.segments {
            href.push('/');
            match segment {
                Segment::Static(value) => href.push_str(value),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| *key == param.as_str())
                        .map(|(_, value)| *value)
                        .ok_or_else(|| anyhow!("route {:?} needs parameter {:?}", name, param))?;
                    if value.is_empty() || value.contains('/') {
                        bail!("invalid value {:?} for parameter {:?}", value, param);
                    }
                    href.push_str(value);
                }
            }
        }
        if compiled.segments.is_empty() {
            href.push('/');
        }
        Ok(href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new("/", ROUTES).unwrap()
    }

    fn resolve_name(table: &RouteTable, url: &str) -> Option<&'static str> {
        table.resolve(url).map(|matched| matched.name())
    }

    #[test]
    fn declared_paths_resolve_to_their_names() {
        let table = table();
        assert_eq!(resolve_name(&table, "/"), Some("home"));
        assert_eq!(resolve_name(&table, "/post/:id"), Some("post"));
        assert_eq!(resolve_name(&table, "/create"), Some("create"));
        assert_eq!(resolve_name(&table, "/post/:id/edit"), Some("edit"));
    }

    #[test]
    fn post_captures_id() {
        let matched = table().resolve("/post/42").unwrap();
        assert_eq!(matched.name(), "post");
        assert_eq!(matched.page(), Page::Post);
        assert_eq!(matched.param("id"), Some("42"));
        assert_eq!(matched.props().get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn edit_is_distinct_from_post() {
        let matched = table().resolve("/post/42/edit").unwrap();
        assert_eq!(matched.name(), "edit");
        assert_eq!(matched.page(), Page::Edit);
        assert_eq!(matched.param("id"), Some("42"));
    }

    #[test]
    fn create_has_no_params() {
        let matched = table().resolve("/create").unwrap();
        assert_eq!(matched.name(), "create");
        assert!(matched.props().is_empty());
    }

    #[test]
    fn unknown_paths_do_not_match() {
        let table = table();
        assert!(table.resolve("/does-not-exist").is_none());
        assert!(table.resolve("/post").is_none());
        assert!(table.resolve("/post/42/edit/again").is_none());
        assert!(table.resolve("/post//edit").is_none());
        assert!(table.resolve("//create").is_none());
        assert!(table.resolve("//evil.com/create").is_none());
    }

    #[test]
    fn names_are_pairwise_distinct() {
        let table = table();
        let names: HashSet<_> = table.routes().map(|route| route.name).collect();
        assert_eq!(names.len(), ROUTES.len());
    }

    #[test]
    fn query_fragment_and_trailing_slash_are_ignored() {
        let table = table();
        assert_eq!(resolve_name(&table, "/create/"), Some("create"));
        assert_eq!(resolve_name(&table, "/post/7?preview=1#comments"), Some("post"));
        assert_eq!(resolve_name(&table, "/CREATE"), Some("create"));
    }

    #[test]
    fn first_match_wins() {
        let routes = [
            Route {
                path: "/post/:id",
                name: "first",
                page: Page::Post,
                props: true,
            },
            Route {
                path: "/post/:slug",
                name: "second",
                page: Page::Post,
                props: true,
            },
        ];
        let table = RouteTable::new("/", &routes).unwrap();
        assert_eq!(resolve_name(&table, "/post/hello"), Some("first"));
    }

    #[test]
    fn props_are_withheld_unless_forwarded() {
        let routes = [Route {
            path: "/tag/:tag",
            name: "tag",
            page: Page::Home,
            props: false,
        }];
        let matched = RouteTable::new("/", &routes).unwrap().resolve("/tag/rust").unwrap();
        assert_eq!(matched.param("tag"), Some("rust"));
        assert!(matched.props().is_empty());
    }

    #[test]
    fn base_prefix_is_stripped() {
        let table = RouteTable::new("/blog/", ROUTES).unwrap();
        assert_eq!(table.base(), "/blog");
        assert_eq!(resolve_name(&table, "/blog"), Some("home"));
        assert_eq!(resolve_name(&table, "/blog/"), Some("home"));
        assert_eq!(resolve_name(&table, "/blog/post/3/edit"), Some("edit"));
        assert!(table.resolve("/post/3").is_none());
        assert!(table.resolve("/blogpost/3").is_none());
    }

    #[test]
    fn base_prefix_ignores_case() {
        let table = RouteTable::new("/Blog", ROUTES).unwrap();
        assert_eq!(resolve_name(&table, "/blog/create"), Some("create"));
        assert_eq!(resolve_name(&table, "/BLOG/post/1"), Some("post"));
        assert!(table.resolve("/blogs/create").is_none());
    }

    #[test]
    fn params_are_percent_decoded() {
        let table = table();
        let matched = table.resolve("/post/4%32").unwrap();
        assert_eq!(matched.param("id"), Some("42"));
        let matched = table.resolve("/post/hello%20world/edit").unwrap();
        assert_eq!(matched.param("id"), Some("hello world"));
        assert!(table.resolve("/post/%FF").is_none());
    }

    #[test]
    fn href_builds_prefixed_urls() {
        let table = table();
        assert_eq!(table.href("home", &[]).unwrap(), "/");
        assert_eq!(table.href("edit", &[("id", "9")]).unwrap(), "/post/9/edit");

        let table = RouteTable::new("/blog", ROUTES).unwrap();
        assert_eq!(table.href("home", &[]).unwrap(), "/blog/");
        assert_eq!(table.href("post", &[("id", "9")]).unwrap(), "/blog/post/9");
        assert_eq!(table.href("create", &[]).unwrap(), "/blog/create");
    }

    #[test]
    fn href_round_trips_through_resolve() {
        let table = RouteTable::new("/blog", ROUTES).unwrap();
        let href = table.href("edit", &[("id", "12")]).unwrap();
        let matched = table.resolve(&href).unwrap();
        assert_eq!(matched.name(), "edit");
        assert_eq!(matched.param("id"), Some("12"));
    }

    #[test]
    fn href_rejects_bad_input() {
        let table = table();
        assert!(table.href("missing", &[]).is_err());
        assert!(table.href("post", &[]).is_err());
        assert!(table.href("post", &[("id", "")]).is_err());
        assert!(table.href("post", &[("id", "1/2")]).is_err());
    }

    #[test]
    fn invalid_tables_are_rejected() {
        let duplicate = [ROUTES[0], ROUTES[0]];
        assert!(RouteTable::new("/", &duplicate).is_err());

        let relative = [Route {
            path: "post/:id",
            ..ROUTES[1]
        }];
        assert!(RouteTable::new("/", &relative).is_err());

        let repeated = [Route {
            path: "/post/:id/:id",
            ..ROUTES[1]
        }];
        assert!(RouteTable::new("/", &repeated).is_err());
    }
}
