//! Route table and request-to-resource mapping.
//!
//! [`ROUTES`] lists every `/api/v2` shape the proxy understands, most
//! specific first. [`match_route`] walks the table in order and returns the
//! first hit as a [`ResourceRequest`]: the upstream path segments plus any
//! query pairs to forward. Segments captured from the client (`:param`)
//! are carried as opaque strings and never re-split.

use crate::error::RouteError;

/// Prefix every proxied route lives under.
pub const API_PREFIX: &str = "/api/v2";

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_OFFSET: u32 = 0;

/// One entry of the route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    /// Local pattern relative to [`API_PREFIX`]; `:name` captures a segment.
    pub pattern: &'static str,
    /// Upstream path template; `:name` is replaced by the captured segment.
    pub upstream: &'static str,
    /// Accepts `limit` / `offset` and forwards them as query parameters.
    pub paginated: bool,
    /// Human-readable pattern advertised by `GET /`.
    pub display: &'static str,
}

pub static ROUTES: &[RouteSpec] = &[
    RouteSpec {
        pattern: "/pokemon/:name_or_id",
        upstream: "/pokemon/:name_or_id",
        paginated: false,
        display: "/api/v2/pokemon/{nameOrId}",
    },
    RouteSpec {
        pattern: "/pokemon",
        upstream: "/pokemon",
        paginated: true,
        display: "/api/v2/pokemon?limit={limit}&offset={offset}",
    },
    RouteSpec {
        pattern: "/pokemon-species/:name_or_id",
        upstream: "/pokemon-species/:name_or_id",
        paginated: false,
        display: "/api/v2/pokemon-species/{nameOrId}",
    },
    RouteSpec {
        pattern: "/ability/:name_or_id",
        upstream: "/ability/:name_or_id",
        paginated: false,
        display: "/api/v2/ability/{nameOrId}",
    },
    RouteSpec {
        pattern: "/type/:name_or_id",
        upstream: "/type/:name_or_id",
        paginated: false,
        display: "/api/v2/type/{nameOrId}",
    },
    RouteSpec {
        pattern: "/move/:name_or_id",
        upstream: "/move/:name_or_id",
        paginated: false,
        display: "/api/v2/move/{nameOrId}",
    },
    // Catch-alls go last so they never shadow the named resources above.
    RouteSpec {
        pattern: "/:endpoint",
        upstream: "/:endpoint",
        paginated: false,
        display: "/api/v2/{endpoint}",
    },
    RouteSpec {
        pattern: "/:endpoint/:id",
        upstream: "/:endpoint/:id",
        paginated: false,
        display: "/api/v2/{endpoint}/{id}",
    },
];

/// An upstream call, fully resolved: path segments and ordered query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ResourceRequest {
    #[must_use]
    pub fn new(segments: Vec<String>, query: Vec<(String, String)>) -> Self {
        Self { segments, query }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Resource path as logged, e.g. `/pokemon/25`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    /// Read `limit` and `offset` from a raw query string.
    ///
    /// Missing or empty values fall back to the defaults, the first
    /// occurrence of a repeated key wins, anything that is not a `u32`
    /// is rejected.
    pub fn from_query(query: Option<&str>) -> Result<Self, RouteError> {
        let mut limit = None;
        let mut offset = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            let (name, slot) = match &*key {
                "limit" => ("limit", &mut limit),
                "offset" => ("offset", &mut offset),
                _ => continue,
            };
            if slot.is_some() || value.is_empty() {
                continue;
            }
            let parsed = value.parse::<u32>().map_err(|_| RouteError::InvalidParam {
                name,
                value: value.into_owned(),
            })?;
            *slot = Some(parsed);
        }

        Ok(Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            offset: offset.unwrap_or(DEFAULT_OFFSET),
        })
    }

    fn into_pairs(self) -> Vec<(String, String)> {
        vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }
}

/// Resolve the segments after [`API_PREFIX`] against [`ROUTES`].
///
/// Returns `Ok(None)` when no route has the request's shape, and an error
/// when the shape matched but its query parameters are malformed.
pub fn match_route(
    segments: &[&str],
    query: Option<&str>,
) -> Result<Option<ResourceRequest>, RouteError> {
    for route in ROUTES {
        let Some(params) = capture(route.pattern, segments) else {
            continue;
        };

        let upstream = route
            .upstream
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.strip_prefix(':')
                    .and_then(|name| params.iter().find(|(n, _)| *n == name))
                    .map_or(s, |(_, value)| *value)
                    .to_string()
            })
            .collect();

        let query = if route.paginated {
            Pagination::from_query(query)?.into_pairs()
        } else {
            Vec::new()
        };

        return Ok(Some(ResourceRequest::new(upstream, query)));
    }

    Ok(None)
}

/// Match `segments` against a `:param` pattern, returning the captures.
fn capture<'a>(
    pattern: &'static str,
    segments: &[&'a str],
) -> Option<Vec<(&'static str, &'a str)>> {
    let pattern_segments: Vec<&'static str> =
        pattern.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != segments.len() {
        return None;
    }

    let mut params = Vec::new();
    for (ps, rs) in pattern_segments.into_iter().zip(segments.iter().copied()) {
        if let Some(name) = ps.strip_prefix(':') {
            // Dot segments would be collapsed when the upstream URL is built.
            if rs.is_empty() || rs == "." || rs == ".." {
                return None;
            }
            params.push((name, rs));
        } else if ps != rs {
            return None;
        }
    }
    Some(params)
}

/// Every pattern advertised by `GET /`, routes first, `/health` last.
#[must_use]
pub fn documented_endpoints() -> Vec<&'static str> {
    ROUTES
        .iter()
        .map(|r| r.display)
        .chain(std::iter::once("/health"))
        .collect()
}
