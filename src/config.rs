// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line and environment configuration for the API server.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

use crate::constants::{DEFAULT_BIND_ADDRESS, DEFAULT_PROXY_RULES_NAMESPACE};

/// REST API for validating and managing `ProxyRule` resources
#[derive(Parser, Debug, Clone)]
#[command(name = "proxyrule-api", version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP server listens on
    #[arg(long, env = "PROXYRULE_BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: SocketAddr,

    /// Namespace every rule is stored in
    #[arg(long, env = "PROXYRULE_NAMESPACE", default_value = DEFAULT_PROXY_RULES_NAMESPACE)]
    pub namespace: String,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, ignore_case = true)]
    pub log_format: LogFormat,

    /// Backend holding the rules
    #[arg(long, env = "PROXYRULE_STORE", value_enum, default_value_t = StoreKind::Kubernetes)]
    pub store: StoreKind,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact, human readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// `ProxyRule` custom resources in the cluster
    Kubernetes,
    /// Process-local map; contents are lost on restart
    Memory,
}
