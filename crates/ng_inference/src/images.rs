use sha2::{Digest, Sha256};

/// Stable placeholder picture for a headline. Same title, same picture; nothing more.
pub fn image_url_for(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let seed: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("https://picsum.photos/seed/{}/1200/630", seed)
}
