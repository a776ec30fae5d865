/// A macro to simplify read-through caching against a [`TtlCache`](crate::db::TtlCache).
///
/// This macro checks if a fresh value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it awaits the provided future, stores a successful result in
/// the cache for `$ttl`, and returns it. Errors are propagated with `?` and
/// never cached.
///
/// # Arguments
/// * `$cache`: The cache to read and populate.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: The `Duration` the computed value stays valid.
/// * `$block`: The future to await if the value is not found in cache.
///
/// # Example
/// ```rust,ignore
/// let details = cached!(self.details_cache, tmdb_id, DETAILS_CACHE_TTL, async move {
///     self.fetch_details(tmdb_id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get(&key) {
            tracing::debug!(key = ?key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.insert(key, ::std::clone::Clone::clone(&value), $ttl);
            Ok(value)
        }
    }};
}
