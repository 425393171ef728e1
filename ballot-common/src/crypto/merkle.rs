use super::hash::{digest_parts, Digest};

/// Hashes one pair of nodes, left bytes first.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    digest_parts(&[&left.as_bytes()[..], &right.as_bytes()[..]])
}

/// Calculates the Merkle root of a list of leaves.
///
/// Leaves are already hashed. Each level pairs adjacent nodes left to right;
/// an odd node at the end of a level is paired with itself. A single leaf is
/// its own root and an empty list yields [`Digest::ZERO`].
pub fn calculate_merkle_root(leaves: &[Digest]) -> Digest {
    if leaves.is_empty() {
        return Digest::ZERO;
    }

    let mut level: Vec<Digest> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [last] => hash_pair(last, last),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::digest;

    fn leaves(n: usize) -> Vec<Digest> {
        (0..n).map(|i| digest(format!("leaf-{i}").as_bytes())).collect()
    }

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(calculate_merkle_root(&[]), Digest::ZERO);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let l = leaves(1);
        assert_eq!(calculate_merkle_root(&l), l[0]);
    }

    #[test]
    fn test_two_leaves() {
        let l = leaves(2);
        assert_eq!(calculate_merkle_root(&l), hash_pair(&l[0], &l[1]));
    }

    #[test]
    fn test_odd_count_duplicates_last() {
        let l = leaves(3);
        let expected = hash_pair(&hash_pair(&l[0], &l[1]), &hash_pair(&l[2], &l[2]));
        assert_eq!(calculate_merkle_root(&l), expected);
    }

    #[test]
    fn test_five_leaves_duplicate_at_every_odd_level() {
        let l = leaves(5);
        let a = hash_pair(&l[0], &l[1]);
        let b = hash_pair(&l[2], &l[3]);
        let c = hash_pair(&l[4], &l[4]);
        let ab = hash_pair(&a, &b);
        let cc = hash_pair(&c, &c);
        assert_eq!(calculate_merkle_root(&l), hash_pair(&ab, &cc));
    }

    #[test]
    fn test_order_sensitive() {
        let l = leaves(2);
        let swapped = vec![l[1], l[0]];
        assert_ne!(calculate_merkle_root(&l), calculate_merkle_root(&swapped));
    }
}
