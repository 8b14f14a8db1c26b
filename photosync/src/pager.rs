//! Pagination helpers for remote cursors and catalog offset windows

use std::future::Future;

/// Materialize a full listing by following a page-token cursor.
///
/// `fetch_page` receives the token for the page to fetch (`None` for the
/// first) and returns that page's items plus the next token, if any. Items
/// are concatenated in page order. Failure on any page aborts the whole
/// fetch; no partial results are returned.
pub async fn fetch_all<T, E, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), E>>,
{
    let mut all = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let (items, next_token) = fetch_page(page_token.take()).await?;
        all.extend(items);

        match next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(all)
}

/// Materialize a full listing paged by fixed-size offset windows.
///
/// `fetch_window` is called with offsets `0, window, 2*window, ...` until it
/// returns an empty page.
pub async fn fetch_all_offset<T, E, F, Fut>(window: u32, mut fetch_window: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut all = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_window(offset).await?;
        if page.is_empty() {
            break;
        }
        all.extend(page);
        offset += window;
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn follows_cursor_in_page_order() {
        let pages = vec![
            (vec!["A", "B"], Some("p2".to_string())),
            (vec!["C"], None),
        ];
        let mut calls = Vec::new();

        let result = fetch_all(|token| {
            calls.push(token.clone());
            let page = pages[calls.len() - 1].clone();
            async move { Ok::<_, ()>(page) }
        })
        .await
        .unwrap();

        assert_eq!(result, vec!["A", "B", "C"]);
        assert_eq!(calls, vec![None, Some("p2".to_string())]);
    }

    #[tokio::test]
    async fn single_page_without_token_terminates() {
        let result = fetch_all(|_| async { Ok::<_, ()>((vec![1, 2, 3], None)) })
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn page_failure_aborts_whole_fetch() {
        let mut call = 0;
        let result: Result<Vec<i32>, &str> = fetch_all(|_| {
            call += 1;
            let out = if call == 1 {
                Ok((vec![1], Some("next".to_string())))
            } else {
                Err("boom")
            };
            async move { out }
        })
        .await;

        assert_eq!(result.unwrap_err(), "boom");
    }

    #[tokio::test]
    async fn offset_windows_until_empty_page() {
        let mut offsets = Vec::new();
        let result = fetch_all_offset(100, |offset| {
            offsets.push(offset);
            let page: Vec<u32> = match offset {
                0 => (0..100).collect(),
                100 => vec![100, 101],
                _ => vec![],
            };
            async move { Ok::<_, ()>(page) }
        })
        .await
        .unwrap();

        assert_eq!(result.len(), 102);
        assert_eq!(offsets, vec![0, 100, 200]);
    }
}
