use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const ID_LEN: usize = 10;
const COMMENT_SUFFIX_LEN: usize = 8;

/// Short opaque identifier for articles and reviews.
pub fn generate_id() -> String {
    random_alphanumeric(ID_LEN)
}

/// Comment ids carry their author so they stay readable in logs.
pub fn comment_id(author: &str) -> String {
    format!("{}-{}", author, random_alphanumeric(COMMENT_SUFFIX_LEN))
}

pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

fn random_alphanumeric(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
