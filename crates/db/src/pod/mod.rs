mod db;

pub use db::PodDBSled;
