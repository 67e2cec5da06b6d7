#![allow(dead_code)]

pub mod cdn_server;
