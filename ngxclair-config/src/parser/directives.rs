//! Directive table
//!
//! Static map from directive name to the shapes nginx accepts for it. A
//! directive may carry several [`DirectiveSpec`] alternatives, one per module
//! that defines it (e.g. `server` is a block in `http` but takes arguments in
//! `upstream`). The validator tries them last to first.

use super::context::{Context, ContextSet};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Argument count shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments (`n <= 7`)
    Exact(u8),
    /// Any of the listed counts
    OneOf(&'static [u8]),
    /// At least `n` arguments
    AtLeast(u8),
    /// Any number, including none
    Any,
    /// One argument, `on` or `off`
    Flag,
}

impl Arity {
    /// Highest argument count an exact rule can name
    pub const MAX_EXACT: usize = 7;

    /// Whether `count` arguments fit, ignoring flag values
    pub fn accepts_count(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count <= Self::MAX_EXACT && count == n as usize,
            Arity::OneOf(ns) => count <= Self::MAX_EXACT && ns.iter().any(|n| *n as usize == count),
            Arity::AtLeast(n) => count >= n as usize,
            Arity::Any => true,
            Arity::Flag => false,
        }
    }
}

/// One accepted shape of a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSpec {
    pub contexts: ContextSet,
    pub arity: Arity,
    /// Statement must open a block instead of ending in `;`
    pub block: bool,
}

const fn take(contexts: u16, arity: Arity) -> DirectiveSpec {
    DirectiveSpec {
        contexts: ContextSet::from_bits(contexts),
        arity,
        block: false,
    }
}

const fn block(contexts: u16, arity: Arity) -> DirectiveSpec {
    DirectiveSpec {
        contexts: ContextSet::from_bits(contexts),
        arity,
        block: true,
    }
}

// ============================================================
// Context masks
// ============================================================

const MAIN: u16 = Context::Main.bit();
const EVENT: u16 = Context::Events.bit();
const MAIL_MAIN: u16 = Context::MailMain.bit();
const MAIL_SRV: u16 = Context::MailServer.bit();
const STREAM_MAIN: u16 = Context::StreamMain.bit();
const STREAM_SRV: u16 = Context::StreamServer.bit();
const STREAM_UPS: u16 = Context::StreamUpstream.bit();
const HTTP_MAIN: u16 = Context::HttpMain.bit();
const HTTP_SRV: u16 = Context::HttpServer.bit();
const HTTP_LOC: u16 = Context::HttpLocation.bit();
const HTTP_UPS: u16 = Context::HttpUpstream.bit();
const HTTP_SIF: u16 = Context::HttpServerIf.bit();
const HTTP_LIF: u16 = Context::HttpLocationIf.bit();
const HTTP_LMT: u16 = Context::HttpLimitExcept.bit();

const HTTP_MS: u16 = HTTP_MAIN | HTTP_SRV;
const HTTP_MSL: u16 = HTTP_MAIN | HTTP_SRV | HTTP_LOC;
const HTTP_MSLI: u16 = HTTP_MSL | HTTP_LIF;
const HTTP_LOC_IF: u16 = HTTP_LOC | HTTP_LIF;
const HTTP_REWRITE: u16 = HTTP_SRV | HTTP_SIF | HTTP_LOC | HTTP_LIF;
const STREAM_MS: u16 = STREAM_MAIN | STREAM_SRV;
const MAIL_MS: u16 = MAIL_MAIN | MAIL_SRV;
const SSL_HOSTS: u16 = HTTP_MS | MAIL_MS | STREAM_MS;
const ANY_CONF: u16 = (1u16 << Context::ALL.len()) - 1;

// ============================================================
// Arities
// ============================================================

const NOARGS: Arity = Arity::Exact(0);
const TAKE1: Arity = Arity::Exact(1);
const TAKE2: Arity = Arity::Exact(2);
const TAKE01: Arity = Arity::OneOf(&[0, 1]);
const TAKE012: Arity = Arity::OneOf(&[0, 1, 2]);
const TAKE12: Arity = Arity::OneOf(&[1, 2]);
const TAKE13: Arity = Arity::OneOf(&[1, 3]);
const TAKE23: Arity = Arity::OneOf(&[2, 3]);
const TAKE34: Arity = Arity::OneOf(&[3, 4]);
const TAKE123: Arity = Arity::OneOf(&[1, 2, 3]);
const TAKE1234: Arity = Arity::OneOf(&[1, 2, 3, 4]);
const MORE1: Arity = Arity::AtLeast(1);
const MORE2: Arity = Arity::AtLeast(2);
const FLAG: Arity = Arity::Flag;

type Entry = (&'static str, &'static [DirectiveSpec]);

/// Every directive known to the validator
pub static DIRECTIVES: &[Entry] = &[
    // core
    ("daemon", &[take(MAIN, FLAG)]),
    ("master_process", &[take(MAIN, FLAG)]),
    ("timer_resolution", &[take(MAIN, TAKE1)]),
    ("pid", &[take(MAIN, TAKE1)]),
    ("lock_file", &[take(MAIN, TAKE1)]),
    ("worker_processes", &[take(MAIN, TAKE1)]),
    ("debug_points", &[take(MAIN, TAKE1)]),
    ("user", &[take(MAIN, TAKE12)]),
    ("worker_priority", &[take(MAIN, TAKE1)]),
    ("worker_cpu_affinity", &[take(MAIN, MORE1)]),
    ("worker_rlimit_nofile", &[take(MAIN, TAKE1)]),
    ("worker_rlimit_core", &[take(MAIN, TAKE1)]),
    ("worker_shutdown_timeout", &[take(MAIN, TAKE1)]),
    ("working_directory", &[take(MAIN, TAKE1)]),
    ("env", &[take(MAIN, TAKE1)]),
    ("load_module", &[take(MAIN, TAKE1)]),
    ("pcre_jit", &[take(MAIN, FLAG)]),
    ("thread_pool", &[take(MAIN, TAKE23)]),
    ("ssl_engine", &[take(MAIN, TAKE1)]),
    ("google_perftools_profiles", &[take(MAIN, TAKE1)]),
    (
        "error_log",
        &[take(MAIN | HTTP_MSL | MAIL_MS | STREAM_MS, MORE1)],
    ),
    ("include", &[take(ANY_CONF, TAKE1)]),
    ("events", &[block(MAIN, NOARGS)]),
    ("http", &[block(MAIN, NOARGS)]),
    ("mail", &[block(MAIN, NOARGS)]),
    ("stream", &[block(MAIN, NOARGS)]),
    // events
    ("worker_connections", &[take(EVENT, TAKE1)]),
    ("use", &[take(EVENT, TAKE1)]),
    ("multi_accept", &[take(EVENT, FLAG)]),
    ("accept_mutex", &[take(EVENT, FLAG)]),
    ("accept_mutex_delay", &[take(EVENT, TAKE1)]),
    ("debug_connection", &[take(EVENT, TAKE1)]),
    ("worker_aio_requests", &[take(EVENT, TAKE1)]),
    // http core
    (
        "server",
        &[
            block(HTTP_MAIN, NOARGS),
            take(HTTP_UPS, MORE1),
            block(MAIL_MAIN, NOARGS),
            block(STREAM_MAIN, NOARGS),
            take(STREAM_UPS, MORE1),
        ],
    ),
    (
        "server_name",
        &[take(HTTP_SRV, MORE1), take(MAIL_MS, TAKE1)],
    ),
    (
        "listen",
        &[take(HTTP_SRV, MORE1), take(MAIL_SRV, MORE1), take(STREAM_SRV, MORE1)],
    ),
    ("location", &[block(HTTP_SRV | HTTP_LOC, TAKE12)]),
    ("root", &[take(HTTP_MSLI, TAKE1)]),
    ("alias", &[take(HTTP_LOC, TAKE1)]),
    ("index", &[take(HTTP_MSL, MORE1)]),
    ("try_files", &[take(HTTP_SRV | HTTP_LOC, MORE2)]),
    ("types", &[block(HTTP_MSL, NOARGS)]),
    ("types_hash_max_size", &[take(HTTP_MSL, TAKE1)]),
    ("types_hash_bucket_size", &[take(HTTP_MSL, TAKE1)]),
    ("default_type", &[take(HTTP_MSL, TAKE1)]),
    ("client_max_body_size", &[take(HTTP_MSL, TAKE1)]),
    ("client_body_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    ("client_body_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("client_body_temp_path", &[take(HTTP_MSL, TAKE1234)]),
    ("client_body_in_file_only", &[take(HTTP_MSL, TAKE1)]),
    ("client_body_in_single_buffer", &[take(HTTP_MSL, FLAG)]),
    ("client_header_timeout", &[take(HTTP_MS, TAKE1)]),
    ("client_header_buffer_size", &[take(HTTP_MS, TAKE1)]),
    ("large_client_header_buffers", &[take(HTTP_MS, TAKE2)]),
    ("connection_pool_size", &[take(HTTP_MS, TAKE1)]),
    ("request_pool_size", &[take(HTTP_MS, TAKE1)]),
    (
        "keepalive_timeout",
        &[take(HTTP_MSL, TAKE12), take(HTTP_UPS, TAKE1)],
    ),
    (
        "keepalive_requests",
        &[take(HTTP_MSL, TAKE1), take(HTTP_UPS, TAKE1)],
    ),
    ("keepalive_time", &[take(HTTP_MSL, TAKE1), take(HTTP_UPS, TAKE1)]),
    ("keepalive_disable", &[take(HTTP_MSL, TAKE12)]),
    ("sendfile", &[take(HTTP_MSLI, FLAG)]),
    ("sendfile_max_chunk", &[take(HTTP_MSL, TAKE1)]),
    ("tcp_nopush", &[take(HTTP_MSL, FLAG)]),
    ("tcp_nodelay", &[take(HTTP_MSL, FLAG), take(STREAM_MS, FLAG)]),
    ("send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("send_lowat", &[take(HTTP_MSL, TAKE1)]),
    ("postpone_output", &[take(HTTP_MSL, TAKE1)]),
    ("limit_rate", &[take(HTTP_MSLI, TAKE1)]),
    ("limit_rate_after", &[take(HTTP_MSLI, TAKE1)]),
    ("server_tokens", &[take(HTTP_MSL, TAKE1)]),
    ("server_names_hash_max_size", &[take(HTTP_MAIN, TAKE1)]),
    ("server_names_hash_bucket_size", &[take(HTTP_MAIN, TAKE1)]),
    (
        "variables_hash_max_size",
        &[take(HTTP_MAIN, TAKE1), take(STREAM_MAIN, TAKE1)],
    ),
    (
        "variables_hash_bucket_size",
        &[take(HTTP_MAIN, TAKE1), take(STREAM_MAIN, TAKE1)],
    ),
    ("underscores_in_headers", &[take(HTTP_MS, FLAG)]),
    ("ignore_invalid_headers", &[take(HTTP_MS, FLAG)]),
    ("merge_slashes", &[take(HTTP_MS, FLAG)]),
    ("internal", &[take(HTTP_LOC, NOARGS)]),
    ("error_page", &[take(HTTP_MSLI, MORE2)]),
    ("recursive_error_pages", &[take(HTTP_MSL, FLAG)]),
    ("log_not_found", &[take(HTTP_MSL, FLAG)]),
    ("log_subrequest", &[take(HTTP_MSL, FLAG)]),
    (
        "resolver",
        &[take(HTTP_MSL, MORE1), take(MAIL_MS, MORE1), take(STREAM_MS, MORE1)],
    ),
    (
        "resolver_timeout",
        &[take(HTTP_MSL, TAKE1), take(MAIL_MS, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    ("absolute_redirect", &[take(HTTP_MSL, FLAG)]),
    ("server_name_in_redirect", &[take(HTTP_MSL, FLAG)]),
    ("port_in_redirect", &[take(HTTP_MSL, FLAG)]),
    ("msie_padding", &[take(HTTP_MSL, FLAG)]),
    ("msie_refresh", &[take(HTTP_MSL, FLAG)]),
    ("open_file_cache", &[take(HTTP_MSL, TAKE12)]),
    ("open_file_cache_valid", &[take(HTTP_MSL, TAKE1)]),
    ("open_file_cache_min_uses", &[take(HTTP_MSL, TAKE1)]),
    ("open_file_cache_errors", &[take(HTTP_MSL, FLAG)]),
    ("output_buffers", &[take(HTTP_MSL, TAKE2)]),
    ("aio", &[take(HTTP_MSL, TAKE1)]),
    ("aio_write", &[take(HTTP_MSL, FLAG)]),
    ("directio", &[take(HTTP_MSL, TAKE1)]),
    ("directio_alignment", &[take(HTTP_MSL, TAKE1)]),
    ("read_ahead", &[take(HTTP_MSL, TAKE1)]),
    ("reset_timedout_connection", &[take(HTTP_MSL, FLAG)]),
    ("lingering_close", &[take(HTTP_MSL, TAKE1)]),
    ("lingering_time", &[take(HTTP_MSL, TAKE1)]),
    ("lingering_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("satisfy", &[take(HTTP_MSL, TAKE1)]),
    ("chunked_transfer_encoding", &[take(HTTP_MSL, FLAG)]),
    ("etag", &[take(HTTP_MSL, FLAG)]),
    ("if_modified_since", &[take(HTTP_MSL, TAKE1)]),
    ("max_ranges", &[take(HTTP_MSL, TAKE1)]),
    ("disable_symlinks", &[take(HTTP_MSL, TAKE12)]),
    ("limit_except", &[block(HTTP_LOC, MORE1)]),
    ("subrequest_output_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    ("auth_delay", &[take(HTTP_MSL, TAKE1)]),
    ("http2", &[take(HTTP_MS, FLAG)]),
    ("http2_max_concurrent_streams", &[take(HTTP_MS, TAKE1)]),
    ("http2_body_preread_size", &[take(HTTP_MS, TAKE1)]),
    ("http2_chunk_size", &[take(HTTP_MSL, TAKE1)]),
    ("http2_recv_buffer_size", &[take(HTTP_MAIN, TAKE1)]),
    ("http3", &[take(HTTP_MS, FLAG)]),
    ("quic_retry", &[take(HTTP_MS, FLAG)]),
    // rewrite
    ("rewrite", &[take(HTTP_REWRITE, TAKE23)]),
    ("return", &[take(HTTP_REWRITE, TAKE12), take(STREAM_SRV, TAKE1)]),
    ("break", &[take(HTTP_REWRITE, NOARGS)]),
    ("if", &[block(HTTP_SRV | HTTP_LOC, MORE1)]),
    ("set", &[take(HTTP_REWRITE, TAKE2), take(STREAM_SRV, TAKE2)]),
    ("rewrite_log", &[take(HTTP_MAIN | HTTP_REWRITE, FLAG)]),
    ("uninitialized_variable_warn", &[take(HTTP_MAIN | HTTP_REWRITE, FLAG)]),
    // access and auth
    ("allow", &[take(HTTP_MSL | HTTP_LMT, TAKE1), take(STREAM_MS, TAKE1)]),
    ("deny", &[take(HTTP_MSL | HTTP_LMT, TAKE1), take(STREAM_MS, TAKE1)]),
    ("auth_basic", &[take(HTTP_MSL | HTTP_LMT, TAKE1)]),
    ("auth_basic_user_file", &[take(HTTP_MSL | HTTP_LMT, TAKE1)]),
    ("auth_request", &[take(HTTP_MSL, TAKE1)]),
    ("auth_request_set", &[take(HTTP_MSL, TAKE2)]),
    // index
    ("autoindex", &[take(HTTP_MSL, FLAG)]),
    ("autoindex_exact_size", &[take(HTTP_MSL, FLAG)]),
    ("autoindex_format", &[take(HTTP_MSL, TAKE1)]),
    ("autoindex_localtime", &[take(HTTP_MSL, FLAG)]),
    ("random_index", &[take(HTTP_LOC, FLAG)]),
    // headers
    ("add_header", &[take(HTTP_MSLI, TAKE23)]),
    ("add_trailer", &[take(HTTP_MSLI, TAKE23)]),
    ("expires", &[take(HTTP_MSLI, TAKE12)]),
    // log
    (
        "access_log",
        &[take(HTTP_MSLI | HTTP_LMT, MORE1), take(STREAM_MS, MORE1)],
    ),
    ("log_format", &[take(HTTP_MAIN, MORE2), take(STREAM_MAIN, MORE2)]),
    (
        "open_log_file_cache",
        &[take(HTTP_MSL, TAKE1234), take(STREAM_MS, TAKE1234)],
    ),
    // gzip
    ("gzip", &[take(HTTP_MSLI, FLAG)]),
    ("gzip_buffers", &[take(HTTP_MSL, TAKE2)]),
    ("gzip_comp_level", &[take(HTTP_MSL, TAKE1)]),
    ("gzip_disable", &[take(HTTP_MSL, MORE1)]),
    ("gzip_http_version", &[take(HTTP_MSL, TAKE1)]),
    ("gzip_min_length", &[take(HTTP_MSL, TAKE1)]),
    ("gzip_proxied", &[take(HTTP_MSL, MORE1)]),
    ("gzip_types", &[take(HTTP_MSL, MORE1)]),
    ("gzip_vary", &[take(HTTP_MSL, FLAG)]),
    ("gzip_static", &[take(HTTP_MSL, TAKE1)]),
    ("gunzip", &[take(HTTP_MSL, FLAG)]),
    ("gunzip_buffers", &[take(HTTP_MSL, TAKE2)]),
    // limits
    ("limit_conn", &[take(HTTP_MSL, TAKE2), take(STREAM_MS, TAKE2)]),
    ("limit_conn_zone", &[take(HTTP_MAIN, TAKE2), take(STREAM_MAIN, TAKE2)]),
    (
        "limit_conn_log_level",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    ("limit_conn_status", &[take(HTTP_MSL, TAKE1)]),
    ("limit_conn_dry_run", &[take(HTTP_MSL, FLAG), take(STREAM_MS, FLAG)]),
    ("limit_req", &[take(HTTP_MSL, TAKE123)]),
    ("limit_req_zone", &[take(HTTP_MAIN, TAKE34)]),
    ("limit_req_log_level", &[take(HTTP_MSL, TAKE1)]),
    ("limit_req_status", &[take(HTTP_MSL, TAKE1)]),
    ("limit_req_dry_run", &[take(HTTP_MSL, FLAG)]),
    // map, geo, split_clients, charset
    ("map", &[block(HTTP_MAIN, TAKE2), block(STREAM_MAIN, TAKE2)]),
    (
        "map_hash_max_size",
        &[take(HTTP_MAIN, TAKE1), take(STREAM_MAIN, TAKE1)],
    ),
    (
        "map_hash_bucket_size",
        &[take(HTTP_MAIN, TAKE1), take(STREAM_MAIN, TAKE1)],
    ),
    ("geo", &[block(HTTP_MAIN, TAKE12), block(STREAM_MAIN, TAKE12)]),
    (
        "split_clients",
        &[block(HTTP_MAIN, TAKE2), block(STREAM_MAIN, TAKE2)],
    ),
    ("charset", &[take(HTTP_MSLI, TAKE1)]),
    ("source_charset", &[take(HTTP_MSLI, TAKE1)]),
    ("override_charset", &[take(HTTP_MSLI, FLAG)]),
    ("charset_types", &[take(HTTP_MSL, MORE1)]),
    ("charset_map", &[block(HTTP_MAIN, TAKE2)]),
    // ssi and sub
    ("ssi", &[take(HTTP_MSLI, FLAG)]),
    ("ssi_types", &[take(HTTP_MSL, MORE1)]),
    ("sub_filter", &[take(HTTP_MSL, TAKE2)]),
    ("sub_filter_once", &[take(HTTP_MSL, FLAG)]),
    ("sub_filter_types", &[take(HTTP_MSL, MORE1)]),
    ("sub_filter_last_modified", &[take(HTTP_MSL, FLAG)]),
    // proxy
    (
        "proxy_pass",
        &[take(HTTP_LOC_IF | HTTP_LMT, TAKE1), take(STREAM_SRV, TAKE1)],
    ),
    ("proxy_set_header", &[take(HTTP_MSL, TAKE2)]),
    ("proxy_hide_header", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_pass_header", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_ignore_headers", &[take(HTTP_MSL, MORE1)]),
    ("proxy_http_version", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_method", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_pass_request_body", &[take(HTTP_MSL, FLAG)]),
    ("proxy_pass_request_headers", &[take(HTTP_MSL, FLAG)]),
    ("proxy_set_body", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_buffering", &[take(HTTP_MSL, FLAG)]),
    ("proxy_request_buffering", &[take(HTTP_MSL, FLAG)]),
    (
        "proxy_buffer_size",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    ("proxy_buffers", &[take(HTTP_MSL, TAKE2)]),
    ("proxy_busy_buffers_size", &[take(HTTP_MSL, TAKE1)]),
    (
        "proxy_connect_timeout",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    ("proxy_read_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_timeout", &[take(STREAM_MS, TAKE1), take(MAIL_MS, TAKE1)]),
    ("proxy_redirect", &[take(HTTP_MSL, TAKE12)]),
    ("proxy_cookie_domain", &[take(HTTP_MSL, TAKE12)]),
    ("proxy_cookie_path", &[take(HTTP_MSL, TAKE12)]),
    ("proxy_cookie_flags", &[take(HTTP_MSL, MORE1)]),
    ("proxy_cache", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_cache_path", &[take(HTTP_MAIN, MORE2)]),
    ("proxy_cache_key", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_cache_valid", &[take(HTTP_MSL, MORE1)]),
    ("proxy_cache_bypass", &[take(HTTP_MSL, MORE1)]),
    ("proxy_no_cache", &[take(HTTP_MSL, MORE1)]),
    ("proxy_cache_methods", &[take(HTTP_MSL, MORE1)]),
    ("proxy_cache_min_uses", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_cache_use_stale", &[take(HTTP_MSL, MORE1)]),
    ("proxy_cache_lock", &[take(HTTP_MSL, FLAG)]),
    ("proxy_cache_lock_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_cache_lock_age", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_cache_revalidate", &[take(HTTP_MSL, FLAG)]),
    ("proxy_cache_background_update", &[take(HTTP_MSL, FLAG)]),
    ("proxy_cache_convert_head", &[take(HTTP_MSL, FLAG)]),
    ("proxy_temp_path", &[take(HTTP_MSL, TAKE1234)]),
    ("proxy_max_temp_file_size", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_temp_file_write_size", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_intercept_errors", &[take(HTTP_MSL, FLAG)]),
    ("proxy_ignore_client_abort", &[take(HTTP_MSL, FLAG)]),
    ("proxy_force_ranges", &[take(HTTP_MSL, FLAG)]),
    ("proxy_limit_rate", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_store", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_store_access", &[take(HTTP_MSL, TAKE123)]),
    ("proxy_headers_hash_max_size", &[take(HTTP_MSL, TAKE1)]),
    ("proxy_headers_hash_bucket_size", &[take(HTTP_MSL, TAKE1)]),
    (
        "proxy_next_upstream",
        &[take(HTTP_MSL, MORE1), take(STREAM_MS, FLAG)],
    ),
    (
        "proxy_next_upstream_tries",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_next_upstream_timeout",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_socket_keepalive",
        &[take(HTTP_MSL, FLAG), take(STREAM_MS, FLAG)],
    ),
    ("proxy_bind", &[take(HTTP_MSL, TAKE12), take(STREAM_MS, TAKE12)]),
    ("proxy_ssl", &[take(STREAM_MS, FLAG)]),
    (
        "proxy_ssl_server_name",
        &[take(HTTP_MSL, FLAG), take(STREAM_MS, FLAG)],
    ),
    ("proxy_ssl_name", &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)]),
    ("proxy_ssl_verify", &[take(HTTP_MSL, FLAG), take(STREAM_MS, FLAG)]),
    (
        "proxy_ssl_verify_depth",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_ssl_trusted_certificate",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_ssl_certificate",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_ssl_certificate_key",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_ssl_protocols",
        &[take(HTTP_MSL, MORE1), take(STREAM_MS, MORE1)],
    ),
    (
        "proxy_ssl_ciphers",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    (
        "proxy_ssl_session_reuse",
        &[take(HTTP_MSL, FLAG), take(STREAM_MS, FLAG)],
    ),
    (
        "proxy_ssl_conf_command",
        &[take(HTTP_MSL, TAKE2), take(STREAM_MS, TAKE2)],
    ),
    ("proxy_protocol", &[take(STREAM_MS, FLAG)]),
    ("proxy_upload_rate", &[take(STREAM_MS, TAKE1)]),
    ("proxy_download_rate", &[take(STREAM_MS, TAKE1)]),
    ("proxy_responses", &[take(STREAM_MS, TAKE1)]),
    // fastcgi
    ("fastcgi_pass", &[take(HTTP_LOC_IF, TAKE1)]),
    ("fastcgi_param", &[take(HTTP_MSL, TAKE23)]),
    ("fastcgi_index", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_split_path_info", &[take(HTTP_LOC, TAKE1)]),
    ("fastcgi_buffers", &[take(HTTP_MSL, TAKE2)]),
    ("fastcgi_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_buffering", &[take(HTTP_MSL, FLAG)]),
    ("fastcgi_busy_buffers_size", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_request_buffering", &[take(HTTP_MSL, FLAG)]),
    ("fastcgi_connect_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_read_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_intercept_errors", &[take(HTTP_MSL, FLAG)]),
    ("fastcgi_hide_header", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_pass_header", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_ignore_headers", &[take(HTTP_MSL, MORE1)]),
    ("fastcgi_keep_conn", &[take(HTTP_MSL, FLAG)]),
    ("fastcgi_cache", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_cache_path", &[take(HTTP_MAIN, MORE2)]),
    ("fastcgi_cache_key", &[take(HTTP_MSL, TAKE1)]),
    ("fastcgi_cache_valid", &[take(HTTP_MSL, MORE1)]),
    ("fastcgi_cache_bypass", &[take(HTTP_MSL, MORE1)]),
    ("fastcgi_no_cache", &[take(HTTP_MSL, MORE1)]),
    ("fastcgi_next_upstream", &[take(HTTP_MSL, MORE1)]),
    ("fastcgi_temp_path", &[take(HTTP_MSL, TAKE1234)]),
    // uwsgi
    ("uwsgi_pass", &[take(HTTP_LOC_IF, TAKE1)]),
    ("uwsgi_param", &[take(HTTP_MSL, TAKE23)]),
    ("uwsgi_modifier1", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_modifier2", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_buffers", &[take(HTTP_MSL, TAKE2)]),
    ("uwsgi_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_connect_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_read_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_hide_header", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_intercept_errors", &[take(HTTP_MSL, FLAG)]),
    ("uwsgi_cache", &[take(HTTP_MSL, TAKE1)]),
    ("uwsgi_cache_path", &[take(HTTP_MAIN, MORE2)]),
    ("uwsgi_temp_path", &[take(HTTP_MSL, TAKE1234)]),
    // scgi
    ("scgi_pass", &[take(HTTP_LOC_IF, TAKE1)]),
    ("scgi_param", &[take(HTTP_MSL, TAKE23)]),
    ("scgi_buffers", &[take(HTTP_MSL, TAKE2)]),
    ("scgi_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    ("scgi_connect_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("scgi_read_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("scgi_send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("scgi_temp_path", &[take(HTTP_MSL, TAKE1234)]),
    // grpc
    ("grpc_pass", &[take(HTTP_LOC_IF, TAKE1)]),
    ("grpc_set_header", &[take(HTTP_MSL, TAKE2)]),
    ("grpc_hide_header", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_pass_header", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_connect_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_read_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_intercept_errors", &[take(HTTP_MSL, FLAG)]),
    ("grpc_next_upstream", &[take(HTTP_MSL, MORE1)]),
    ("grpc_socket_keepalive", &[take(HTTP_MSL, FLAG)]),
    ("grpc_ssl_certificate", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_ssl_certificate_key", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_ssl_trusted_certificate", &[take(HTTP_MSL, TAKE1)]),
    ("grpc_ssl_verify", &[take(HTTP_MSL, FLAG)]),
    ("grpc_ssl_server_name", &[take(HTTP_MSL, FLAG)]),
    ("grpc_ssl_name", &[take(HTTP_MSL, TAKE1)]),
    // memcached
    ("memcached_pass", &[take(HTTP_LOC_IF, TAKE1)]),
    ("memcached_connect_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("memcached_read_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("memcached_send_timeout", &[take(HTTP_MSL, TAKE1)]),
    ("memcached_buffer_size", &[take(HTTP_MSL, TAKE1)]),
    // ssl
    ("ssl", &[take(HTTP_MS | MAIL_MS, FLAG)]),
    ("ssl_certificate", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_certificate_key", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_password_file", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_dhparam", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_ecdh_curve", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_protocols", &[take(SSL_HOSTS, MORE1)]),
    ("ssl_ciphers", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_prefer_server_ciphers", &[take(SSL_HOSTS, FLAG)]),
    ("ssl_session_cache", &[take(SSL_HOSTS, TAKE12)]),
    ("ssl_session_timeout", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_session_tickets", &[take(SSL_HOSTS, FLAG)]),
    ("ssl_session_ticket_key", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_trusted_certificate", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_client_certificate", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_verify_client", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_verify_depth", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_crl", &[take(SSL_HOSTS, TAKE1)]),
    ("ssl_conf_command", &[take(SSL_HOSTS, TAKE2)]),
    ("ssl_stapling", &[take(HTTP_MS, FLAG)]),
    ("ssl_stapling_verify", &[take(HTTP_MS, FLAG)]),
    ("ssl_stapling_file", &[take(HTTP_MS, TAKE1)]),
    ("ssl_stapling_responder", &[take(HTTP_MS, TAKE1)]),
    ("ssl_buffer_size", &[take(HTTP_MS, TAKE1)]),
    ("ssl_early_data", &[take(HTTP_MS, FLAG)]),
    ("ssl_reject_handshake", &[take(HTTP_MS, FLAG)]),
    ("ssl_handshake_timeout", &[take(STREAM_MS, TAKE1)]),
    ("ssl_preread", &[take(STREAM_MS, FLAG)]),
    // upstream
    ("upstream", &[block(HTTP_MAIN, TAKE1), block(STREAM_MAIN, TAKE1)]),
    ("zone", &[take(HTTP_UPS | STREAM_UPS, TAKE12)]),
    ("hash", &[take(HTTP_UPS | STREAM_UPS, TAKE12)]),
    ("ip_hash", &[take(HTTP_UPS, NOARGS)]),
    ("least_conn", &[take(HTTP_UPS | STREAM_UPS, NOARGS)]),
    ("random", &[take(HTTP_UPS | STREAM_UPS, TAKE012)]),
    ("keepalive", &[take(HTTP_UPS, TAKE1)]),
    ("ntlm", &[take(HTTP_UPS, NOARGS)]),
    // realip, status and misc http modules
    (
        "set_real_ip_from",
        &[take(HTTP_MSL, TAKE1), take(STREAM_MS, TAKE1)],
    ),
    ("real_ip_header", &[take(HTTP_MSL, TAKE1)]),
    ("real_ip_recursive", &[take(HTTP_MSL, FLAG)]),
    ("stub_status", &[take(HTTP_SRV | HTTP_LOC, TAKE01)]),
    ("mirror", &[take(HTTP_MSL, TAKE1)]),
    ("mirror_request_body", &[take(HTTP_MSL, FLAG)]),
    ("secure_link", &[take(HTTP_MSL, TAKE1)]),
    ("secure_link_md5", &[take(HTTP_MSL, TAKE1)]),
    ("secure_link_secret", &[take(HTTP_LOC, TAKE1)]),
    ("empty_gif", &[take(HTTP_LOC, NOARGS)]),
    ("userid", &[take(HTTP_MSL, TAKE1)]),
    ("userid_name", &[take(HTTP_MSL, TAKE1)]),
    ("userid_domain", &[take(HTTP_MSL, TAKE1)]),
    ("userid_path", &[take(HTTP_MSL, TAKE1)]),
    ("userid_expires", &[take(HTTP_MSL, TAKE1)]),
    ("userid_mark", &[take(HTTP_MSL, TAKE1)]),
    ("userid_service", &[take(HTTP_MSL, TAKE1)]),
    ("valid_referers", &[take(HTTP_SRV | HTTP_LOC, MORE1)]),
    ("referer_hash_max_size", &[take(HTTP_SRV | HTTP_LOC, TAKE1)]),
    ("referer_hash_bucket_size", &[take(HTTP_SRV | HTTP_LOC, TAKE1)]),
    ("ancient_browser", &[take(HTTP_MSL, MORE1)]),
    ("modern_browser", &[take(HTTP_MSL, TAKE12)]),
    ("image_filter", &[take(HTTP_LOC, TAKE123)]),
    ("dav_methods", &[take(HTTP_MSL, MORE1)]),
    ("dav_access", &[take(HTTP_MSL, TAKE123)]),
    ("create_full_put_path", &[take(HTTP_MSL, FLAG)]),
    ("mp4", &[take(HTTP_LOC, NOARGS)]),
    ("flv", &[take(HTTP_LOC, NOARGS)]),
    ("slice", &[take(HTTP_MSL, TAKE1)]),
    ("perl_modules", &[take(HTTP_MAIN, TAKE1)]),
    ("perl_require", &[take(HTTP_MAIN, TAKE1)]),
    ("perl_set", &[take(HTTP_MAIN, TAKE2)]),
    ("perl", &[take(HTTP_LOC | HTTP_LMT, TAKE1)]),
    ("js_import", &[take(HTTP_MSL, TAKE13), take(STREAM_MS, TAKE13)]),
    ("js_path", &[take(HTTP_MAIN, TAKE1), take(STREAM_MAIN, TAKE1)]),
    ("js_set", &[take(HTTP_MSL, TAKE2), take(STREAM_MS, TAKE2)]),
    ("js_content", &[take(HTTP_LOC_IF | HTTP_LMT, TAKE1)]),
    // stream core
    ("preread_buffer_size", &[take(STREAM_MS, TAKE1)]),
    ("preread_timeout", &[take(STREAM_MS, TAKE1)]),
    ("proxy_protocol_timeout", &[take(STREAM_MS, TAKE1)]),
    ("pass", &[take(STREAM_SRV, TAKE1)]),
    // mail
    ("protocol", &[take(MAIL_SRV, TAKE1)]),
    ("timeout", &[take(MAIL_MS, TAKE1)]),
    ("max_errors", &[take(MAIL_MS, TAKE1)]),
    ("starttls", &[take(MAIL_MS, TAKE1)]),
    ("auth_http", &[take(MAIL_MS, TAKE1)]),
    ("auth_http_header", &[take(MAIL_MS, TAKE2)]),
    ("auth_http_pass_client_cert", &[take(MAIL_MS, FLAG)]),
    ("auth_http_timeout", &[take(MAIL_MS, TAKE1)]),
    ("proxy", &[take(MAIL_MS, FLAG)]),
    ("proxy_buffer", &[take(MAIL_MS, TAKE1)]),
    ("proxy_pass_error_message", &[take(MAIL_MS, FLAG)]),
    ("proxy_smtp_auth", &[take(MAIL_MS, FLAG)]),
    ("xclient", &[take(MAIL_MS, FLAG)]),
    ("smtp_auth", &[take(MAIL_MS, MORE1)]),
    ("smtp_capabilities", &[take(MAIL_MS, MORE1)]),
    ("smtp_client_buffer", &[take(MAIL_MS, TAKE1)]),
    ("smtp_greeting_delay", &[take(MAIL_MS, TAKE1)]),
    ("imap_auth", &[take(MAIL_MS, MORE1)]),
    ("imap_capabilities", &[take(MAIL_MS, MORE1)]),
    ("imap_client_buffer", &[take(MAIL_MS, TAKE1)]),
    ("pop3_auth", &[take(MAIL_MS, MORE1)]),
    ("pop3_capabilities", &[take(MAIL_MS, MORE1)]),
    // openresty lua; a lexed block arrives as one argument
    ("lua_package_path", &[take(HTTP_MAIN, TAKE1)]),
    ("lua_package_cpath", &[take(HTTP_MAIN, TAKE1)]),
    ("lua_shared_dict", &[take(HTTP_MAIN, TAKE2)]),
    ("lua_code_cache", &[take(HTTP_MSLI, FLAG)]),
    ("init_by_lua_block", &[take(HTTP_MAIN, TAKE1)]),
    ("init_worker_by_lua_block", &[take(HTTP_MAIN, TAKE1)]),
    ("exit_worker_by_lua_block", &[take(HTTP_MAIN, TAKE1)]),
    ("set_by_lua_block", &[take(HTTP_REWRITE, TAKE2)]),
    ("server_rewrite_by_lua_block", &[take(HTTP_MS, TAKE1)]),
    ("rewrite_by_lua_block", &[take(HTTP_MSLI, TAKE1)]),
    ("access_by_lua_block", &[take(HTTP_MSLI, TAKE1)]),
    ("content_by_lua_block", &[take(HTTP_LOC_IF, TAKE1)]),
    ("header_filter_by_lua_block", &[take(HTTP_MSLI, TAKE1)]),
    ("body_filter_by_lua_block", &[take(HTTP_MSLI, TAKE1)]),
    ("log_by_lua_block", &[take(HTTP_MSLI, TAKE1)]),
    ("balancer_by_lua_block", &[take(HTTP_UPS, TAKE1)]),
    ("ssl_certificate_by_lua_block", &[take(HTTP_MS, TAKE1)]),
    ("ssl_client_hello_by_lua_block", &[take(HTTP_MS, TAKE1)]),
    ("ssl_session_fetch_by_lua_block", &[take(HTTP_MAIN, TAKE1)]),
    ("ssl_session_store_by_lua_block", &[take(HTTP_MAIN, TAKE1)]),
    ("ssl_ocsp_responder", &[take(HTTP_MS, TAKE1)]),
    ("ssl_ocsp", &[take(HTTP_MS, TAKE1)]),
    ("ssl_ocsp_cache", &[take(HTTP_MS, TAKE1)]),
];

static INDEX: LazyLock<HashMap<&'static str, &'static [DirectiveSpec]>> =
    LazyLock::new(|| DIRECTIVES.iter().copied().collect());

/// Spec alternatives for `name`, in declaration order
pub fn lookup(name: &str) -> Option<&'static [DirectiveSpec]> {
    INDEX.get(name).copied()
}
