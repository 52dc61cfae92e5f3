// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Redirect relay and the secondary server it points at

use super::body::{full, status_response, text_response, ResponseBody};
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Method, Request, Response, StatusCode};

/// Answer any request with `302 Found` to the same path-and-query on `target`
pub fn redirect<B>(req: &Request<B>, target: &str) -> Response<ResponseBody> {
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = format!("{}{}", target.trim_end_matches('/'), path);

    let Ok(location_value) = HeaderValue::from_str(&location) else {
        tracing::error!("Cannot build Location header from {}", location);
        return status_response(StatusCode::INTERNAL_SERVER_ERROR);
    };

    tracing::info!("Redirecting {} to {}", path, location);

    let body = if req.method() == Method::GET || req.method() == Method::HEAD {
        full(format!(
            "<a href=\"{}\">Found</a>.\n",
            html_escape(&location)
        ))
    } else {
        full("")
    };

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, location_value);
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

/// Secondary server: static text for `/redir` and `/dosmth`
pub fn target<B>(req: &Request<B>) -> Response<ResponseBody> {
    match req.uri().path() {
        path @ ("/redir" | "/dosmth") => text_response(
            StatusCode::OK,
            format!("You were redirected to {}\n", path),
        ),
        _ => status_response(StatusCode::NOT_FOUND),
    }
}

fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REDIRECT_TARGET;
    use http_body_util::BodyExt;

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_redirect_keeps_path() {
        for path in ["/", "/a", "/deep/nested/path", "/redir"] {
            let response = redirect(&request(Method::GET, path), REDIRECT_TARGET);
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers()[LOCATION],
                format!("http://localhost:5001{}", path)
            );
        }
    }

    #[test]
    fn test_redirect_any_method_keeps_query() {
        let response = redirect(&request(Method::POST, "/search?q=rust"), REDIRECT_TARGET);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "http://localhost:5001/search?q=rust"
        );
    }

    #[tokio::test]
    async fn test_redirect_body_links_location() {
        let response = redirect(&request(Method::GET, "/x?a=1&b=2"), "http://localhost:5001/");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            &body[..],
            b"<a href=\"http://localhost:5001/x?a=1&amp;b=2\">Found</a>.\n"
        );
    }

    #[tokio::test]
    async fn test_target_routes() {
        let response = target(&request(Method::GET, "/dosmth"));
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"You were redirected to /dosmth\n");

        let response = target(&request(Method::GET, "/elsewhere"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
