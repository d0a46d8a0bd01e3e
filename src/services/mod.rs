// Service exports
pub mod cache;
pub mod postgres;
pub mod supabase;

pub use cache::{RunCache, CacheKey, CacheError};
pub use postgres::{PostgresClient, PostgresError};
pub use supabase::{SupabaseClient, SupabaseTables, SupabaseError};
