pub mod redash;
