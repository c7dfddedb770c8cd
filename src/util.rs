/// Utility functions or macros can go here.
pub fn build_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for seg in segments {
        url.push('/');
        url.push_str(seg.trim_start_matches('/'));
    }
    url
}

pub(crate) const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Asset hashes prefixed with `a_` are animated and served as GIFs.
pub(crate) fn image_ext(hash: &str) -> &'static str {
    if hash.starts_with("a_") {
        "gif"
    } else {
        "png"
    }
}

/// Builds a CDN image URL: `{CDN_BASE}/{segments...}/{hash}.{png|gif}`.
pub(crate) fn cdn_image(segments: &[&str], hash: &str) -> String {
    let mut url = build_url(CDN_BASE, segments);
    url.push('/');
    url.push_str(hash);
    url.push('.');
    url.push_str(image_ext(hash));
    url
}
