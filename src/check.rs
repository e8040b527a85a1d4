use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::data::Item;
use crate::facets::Facets;
use crate::sanitize::{is_placeholder, sanitize_url};

const TOP_CATEGORIES: usize = 15;

/// Hosts that refuse automated requests; their links are reported as skipped.
const SKIPPED_HOSTS: &[&str] = &["linkedin.com", "facebook.com", "twitter.com", "x.com"];

const USER_AGENT: &str = concat!("technova/", env!("CARGO_PKG_VERSION"), " (link check)");

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub index: usize,
    pub name: String,
    pub detail: String,
}

/// Data-quality and link-safety findings over a loaded directory.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub total: usize,
    pub categories: usize,
    pub popular: usize,
    pub duplicates: Vec<String>,
    pub missing_url: Vec<String>,
    pub missing_category: Vec<String>,
    pub missing_description: Vec<String>,
    pub empty_names: usize,
    pub unsafe_urls: Vec<Issue>,
    pub markup: Vec<Issue>,
    pub top_categories: Vec<(String, usize)>,
    /// Filled only when reachability was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkCheck>>,
}

impl CheckReport {
    pub fn build(items: &[Item], origin: &Url) -> Self {
        let facets = Facets::build(items);

        let mut seen: HashMap<String, usize> = HashMap::new();
        for item in items {
            let key = item.name.trim().to_lowercase();
            if !key.is_empty() {
                *seen.entry(key).or_insert(0) += 1;
            }
        }
        let mut duplicates: Vec<String> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();
        duplicates.sort();

        let names_where = |pred: &dyn Fn(&Item) -> bool| -> Vec<String> {
            items
                .iter()
                .filter(|&i| pred(i))
                .map(|i| i.name.clone())
                .collect()
        };

        let mut unsafe_urls = Vec::new();
        let mut markup = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if let Some(url) = item.url.as_deref().filter(|u| !u.trim().is_empty()) {
                if is_placeholder(&sanitize_url(Some(url), origin)) {
                    unsafe_urls.push(Issue {
                        index,
                        name: item.name.clone(),
                        detail: url.to_string(),
                    });
                }
            }
            let description = item.description.as_deref().unwrap_or_default();
            if item.name.contains('<') || description.contains('<') {
                markup.push(Issue {
                    index,
                    name: item.name.clone(),
                    detail: "markup-like character in name or description".to_string(),
                });
            }
        }

        let mut top_categories: Vec<(String, usize)> = facets
            .counts_by_category
            .iter()
            .map(|(c, n)| (c.clone(), *n))
            .collect();
        top_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_categories.truncate(TOP_CATEGORIES);

        Self {
            total: items.len(),
            categories: facets.counts_by_category.len(),
            popular: items.iter().filter(|i| i.popular).count(),
            duplicates,
            missing_url: names_where(&|i: &Item| i.url.as_deref().is_none_or(|u| u.trim().is_empty())),
            missing_category: names_where(&|i: &Item| i.category.as_deref().is_none_or(|c| c.trim().is_empty())),
            missing_description: names_where(&|i: &Item| i.description().is_none()),
            empty_names: items.iter().filter(|i| i.name.trim().is_empty()).count(),
            unsafe_urls,
            markup,
            top_categories,
            links: None,
        }
    }

    pub fn broken_links(&self) -> impl Iterator<Item = &LinkCheck> {
        self.links.iter().flatten().filter(|l| l.status.is_broken())
    }

    pub fn security_issue_count(&self) -> usize {
        self.unsafe_urls.len() + self.markup.len()
    }

    pub fn has_security_issues(&self) -> bool {
        self.security_issue_count() > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "code")]
pub enum LinkStatus {
    Ok,
    /// Ended up on a different host.
    Redirect,
    Http(u16),
    Timeout,
    ConnectionError,
    Error,
    NoUrl,
    /// Not an http(s) link after sanitizing.
    Unsafe,
    Skipped,
}

impl LinkStatus {
    pub fn is_broken(&self) -> bool {
        !matches!(self, LinkStatus::Ok | LinkStatus::Redirect | LinkStatus::Skipped)
    }

    pub fn label(&self) -> String {
        match self {
            LinkStatus::Ok => "OK".to_string(),
            LinkStatus::Redirect => "REDIRECT".to_string(),
            LinkStatus::Http(code) => format!("HTTP_{}", code),
            LinkStatus::Timeout => "TIMEOUT".to_string(),
            LinkStatus::ConnectionError => "CONNECTION_ERROR".to_string(),
            LinkStatus::Error => "ERROR".to_string(),
            LinkStatus::NoUrl => "NO_URL".to_string(),
            LinkStatus::Unsafe => "UNSAFE".to_string(),
            LinkStatus::Skipped => "SKIPPED".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkCheck {
    pub index: usize,
    pub name: String,
    pub url: String,
    pub status: LinkStatus,
    pub final_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LinkCheckOptions {
    pub timeout: Duration,
    pub workers: usize,
}

impl Default for LinkCheckOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            workers: 20,
        }
    }
}

/// Request every item link with a bounded pool of worker threads.
/// Results come back in item order.
pub fn check_links(
    items: &[Item],
    origin: &Url,
    options: &LinkCheckOptions,
) -> anyhow::Result<Vec<LinkCheck>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .user_agent(USER_AGENT)
        .build()?;

    let next = AtomicUsize::new(0);
    let (next, client) = (&next, &client);
    let workers = options.workers.clamp(1, items.len().max(1));
    let mut results: Vec<LinkCheck> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        done.push(check_link(client, index, item, origin));
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_default())
            .collect()
    });
    results.sort_by_key(|r| r.index);

    tracing::info!(
        checked = results.len(),
        broken = results.iter().filter(|r| r.status.is_broken()).count(),
        "checked links"
    );
    Ok(results)
}

fn check_link(client: &reqwest::blocking::Client, index: usize, item: &Item, origin: &Url) -> LinkCheck {
    let raw = item.url.as_deref().unwrap_or_default().trim();
    let mut check = LinkCheck {
        index,
        name: item.name.clone(),
        url: raw.to_string(),
        status: LinkStatus::Ok,
        final_url: None,
        error: None,
    };

    if raw.is_empty() {
        check.status = LinkStatus::NoUrl;
        return check;
    }
    let href = sanitize_url(Some(raw), origin);
    if is_placeholder(&href) {
        check.status = LinkStatus::Unsafe;
        return check;
    }
    let Ok(target) = Url::parse(&href) else {
        check.status = LinkStatus::Unsafe;
        return check;
    };
    if target.host_str().is_some_and(is_skipped_host) {
        check.status = LinkStatus::Skipped;
        check.final_url = Some(href);
        return check;
    }

    // HEAD first; servers that reject it get a GET.
    let response = match client.head(target.clone()).send() {
        Ok(r) if r.status().is_client_error() || r.status().is_server_error() => {
            client.get(target.clone()).send()
        }
        other => other,
    };

    match response {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().clone();
            check.status = if status.is_client_error() || status.is_server_error() {
                check.error = Some(format!("HTTP {}", status.as_u16()));
                LinkStatus::Http(status.as_u16())
            } else if bare_host(&final_url) != bare_host(&target) {
                check.error = Some(format!(
                    "Redirects to different domain: {}",
                    bare_host(&final_url).unwrap_or_default()
                ));
                LinkStatus::Redirect
            } else {
                LinkStatus::Ok
            };
            check.final_url = Some(final_url.to_string());
        }
        Err(e) => {
            check.status = if e.is_timeout() {
                LinkStatus::Timeout
            } else if e.is_connect() {
                LinkStatus::ConnectionError
            } else {
                LinkStatus::Error
            };
            check.error = Some(e.to_string());
        }
    }
    tracing::debug!(url = %check.url, status = %check.status.label(), "checked link");
    check
}

fn is_skipped_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    SKIPPED_HOSTS
        .iter()
        .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
}

/// Host without a leading "www.", so http->https and www changes are not redirects.
fn bare_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{serve, Response};

    fn origin() -> Url {
        Url::parse("http://localhost/").unwrap()
    }

    fn item(name: &str, url: Option<&str>) -> Item {
        Item {
            name: name.into(),
            url: url.map(Into::into),
            category: Some("Tools".into()),
            description: Some("desc".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_data_passes() {
        let items = vec![item("A", Some("https://a.example")), item("B", Some("/b"))];
        let report = CheckReport::build(&items, &origin());
        assert!(!report.has_security_issues());
        assert!(report.duplicates.is_empty());
        assert!(report.missing_url.is_empty());
        assert_eq!(report.top_categories, vec![("Tools".to_string(), 2)]);
    }

    #[test]
    fn test_flags_unsafe_and_markup() {
        let items = vec![
            item("Evil", Some("javascript:alert(1)")),
            item("<b>Bold</b>", Some("https://b.example")),
        ];
        let report = CheckReport::build(&items, &origin());
        assert_eq!(report.unsafe_urls.len(), 1);
        assert_eq!(report.unsafe_urls[0].index, 0);
        assert_eq!(report.markup.len(), 1);
        assert_eq!(report.security_issue_count(), 2);
    }

    #[test]
    fn test_duplicates_and_missing_fields() {
        let mut items = vec![
            item("Acme", Some("https://a.example")),
            item(" acme ", None),
            item("", Some("https://c.example")),
        ];
        items[2].category = None;
        items[2].description = None;

        let report = CheckReport::build(&items, &origin());
        assert_eq!(report.duplicates, vec!["acme"]);
        assert_eq!(report.missing_url, vec![" acme "]);
        assert_eq!(report.missing_category.len(), 1);
        assert_eq!(report.missing_description.len(), 1);
        assert_eq!(report.empty_names, 1);
        assert!(!report.has_security_issues());
    }

    fn fast() -> LinkCheckOptions {
        LinkCheckOptions {
            timeout: Duration::from_secs(5),
            workers: 1,
        }
    }

    #[test]
    fn test_links_without_network() {
        let items = vec![
            item("Empty", None),
            item("Evil", Some("javascript:alert(1)")),
            item("Social", Some("https://www.linkedin.com/company/acme")),
        ];
        let links = check_links(&items, &origin(), &fast()).unwrap();
        let statuses: Vec<LinkStatus> = links.into_iter().map(|l| l.status).collect();
        assert_eq!(statuses, vec![LinkStatus::NoUrl, LinkStatus::Unsafe, LinkStatus::Skipped]);
    }

    #[test]
    fn test_reachable_and_http_error() {
        // HEAD to /ok succeeds; /gone fails HEAD and the GET retry.
        let (addr, handle) = serve(3, |req| {
            if req.path == "/ok" {
                Response::json(200, "")
            } else {
                Response::json(404, "")
            }
        });
        let items = vec![
            item("Up", Some(&format!("http://{}/ok", addr))),
            item("Down", Some(&format!("http://{}/gone", addr))),
        ];
        let links = check_links(&items, &origin(), &fast()).unwrap();
        let requests = handle.join().unwrap();

        assert_eq!(links[0].status, LinkStatus::Ok);
        assert_eq!(links[1].status, LinkStatus::Http(404));
        assert_eq!(links[1].error.as_deref(), Some("HTTP 404"));
        let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["HEAD", "HEAD", "GET"]);
    }

    #[test]
    fn test_cross_host_redirect() {
        let (target, target_handle) = serve(1, |_| Response::json(200, ""));
        let (addr, handle) = serve(1, move |_| {
            Response::redirect(format!("http://localhost:{}/new", target.port()))
        });
        let items = vec![item("Moved", Some(&format!("http://127.0.0.1:{}/old", addr.port())))];
        let links = check_links(&items, &origin(), &fast()).unwrap();
        handle.join().unwrap();
        target_handle.join().unwrap();

        assert_eq!(links[0].status, LinkStatus::Redirect);
        assert_eq!(
            links[0].final_url.as_deref(),
            Some(format!("http://localhost:{}/new", target.port()).as_str())
        );
        assert!(!links[0].status.is_broken());
    }

    #[test]
    fn test_refused_connection() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let items = vec![item("Gone", Some(&format!("http://127.0.0.1:{}/", port)))];
        let links = check_links(&items, &origin(), &fast()).unwrap();
        assert_eq!(links[0].status, LinkStatus::ConnectionError);
        assert!(links[0].error.is_some());
    }

    #[test]
    fn test_broken_links_only_when_checked() {
        let items = vec![item("Empty", None)];
        let mut report = CheckReport::build(&items, &origin());
        assert_eq!(report.broken_links().count(), 0);
        report.links = Some(check_links(&items, &origin(), &fast()).unwrap());
        assert_eq!(report.broken_links().count(), 1);
    }
}
