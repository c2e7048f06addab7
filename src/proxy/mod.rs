//! Proxy synthesis
//!
//! A [`NodeSchema`] declares a node's children, whether it holds a state of
//! its own, and whether it is a keyed container. [`build_proxy`] turns a
//! schema into a tree of live proxies bound to one service:
//!
//! - menus become [`MenuProxy`] values with every declared child built up
//!   front;
//! - containers become [`ContainerProxy`] values whose items are built on
//!   each lookup, as a [`MenuProxy`] keyed by the item name.
//!
//! [`MenuProxy::resolve`] and [`MenuProxy::dir`] also see children the
//! remote side lists but the schema does not declare.
//!
//! Proxies hold no remote state. Every read and write is one call through
//! the [`Menu`](crate::menu::Menu) facade.

pub mod node;
pub mod schema;

pub use node::{build_proxy, build_proxy_with_tables, ContainerProxy, MenuProxy, ProxyNode, ResolvedChild};
pub use schema::{NodeSchema, Shape};
