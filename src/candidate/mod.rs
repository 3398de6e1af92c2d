//! Candidate ranking shared by the suppression primitives.
//!
//! Both exact NMS and HNMS select by descending score with the lower input
//! index winning ties; the comparator lives here so they cannot drift apart.

pub(crate) mod order;
