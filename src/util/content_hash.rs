//! Streaming content digests for audit records.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::file_tree::{self, FileTree};

/// Number of bytes read per step while hashing.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Digest everything a reader yields, in lower-case hexadecimal.
pub async fn hash_reader<R>(reader: &mut R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest the contents of a file in the given tree.
pub async fn hash_file(tree: &dyn FileTree, path: &Path) -> file_tree::Result<String> {
    let mut reader = tree.open(path).await?;
    Ok(hash_reader(&mut reader).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_tree::{FsFileTree, MemoryFileTreeBuilder, MemoryFsEntry};
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_known_digest() {
        let mut reader: &[u8] = b"";
        assert_eq!(
            hash_reader(&mut reader).await.unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_stable_across_runs() {
        let tree = MemoryFileTreeBuilder::new()
            .add("f.txt", MemoryFsEntry::file("hello world"))
            .build();

        let first = hash_file(&tree, Path::new("f.txt")).await.unwrap();
        let second = hash_file(&tree, Path::new("f.txt")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn test_changes_with_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();

        let tree = FsFileTree::new();
        let before = hash_file(&tree, &path).await.unwrap();

        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"d")
            .unwrap();
        let after = hash_file(&tree, &path).await.unwrap();
        assert_ne!(before, after);

        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(hash_file(&tree, &path).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_multi_chunk_file_matches_one_shot_digest() {
        let size = HASH_CHUNK_SIZE as u64 * 3 + 17;
        let tree = MemoryFileTreeBuilder::new()
            .add("big.bin", MemoryFsEntry::repeated("0123456789", size))
            .build();

        let expected: Vec<u8> = b"0123456789"
            .iter()
            .copied()
            .cycle()
            .take(size as usize)
            .collect();
        let expected = format!("{:x}", Sha256::digest(&expected));

        assert_eq!(hash_file(&tree, Path::new("big.bin")).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let tree = MemoryFileTreeBuilder::new().build();
        let result = hash_file(&tree, Path::new("nope")).await;
        assert!(matches!(result, Err(file_tree::Error::NotFound(_))));
    }
}
