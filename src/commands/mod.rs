pub mod decrypt;
pub mod encrypt;
pub mod keyformat;
pub mod keygen;
pub mod list;
pub mod remove;
pub mod whoami;
