pub mod addressing;
pub mod decision;
pub mod packet;
pub mod topology;
