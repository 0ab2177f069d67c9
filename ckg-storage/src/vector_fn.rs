//! Registers `cosine_distance(a, b)` as a SQLite scalar function so vector
//! KNN (spec.md §4.1 `nearest(insights, query_vec, k, filter_clause)`) can
//! be expressed as plain SQL: `ORDER BY cosine_distance(embedding, ?) LIMIT k`.
//! Embeddings are stored as little-endian `f32` blobs.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn encode_vector(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

pub fn decode_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return f64::MAX;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return f64::MAX;
    }
    let similarity = (dot / (norm_a * norm_b)) as f64;
    (1.0 - similarity).max(0.0)
}

pub fn register_vector_functions(conn: &Connection) -> CkgResult<()> {
    conn.create_scalar_function(
        "cosine_distance",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let a_blob = ctx.get::<Vec<u8>>(0)?;
            let b_blob = ctx.get::<Vec<u8>>(1)?;
            let a = decode_vector(&a_blob);
            let b = decode_vector(&b_blob);
            Ok(cosine_distance(&a, &b))
        },
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
