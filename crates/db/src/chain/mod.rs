mod db;

pub use db::ChainDBSled;
