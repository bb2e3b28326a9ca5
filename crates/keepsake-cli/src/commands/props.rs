//! Props commands - set, consume, show and clear the recovery slot.
//!
//! Slot values are written to `out` exactly as stored: no trailing newline
//! is added, so `keepsake consume > file` reproduces what was set.

use std::io::{Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use keepsake_recovery::RecoveryPropsStore;

use crate::report;

/// Exit code when the slot holds nothing.
const EXIT_EMPTY: u8 = 2;

/// How a props command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The operation succeeded.
    Done,
    /// The substrate rejected the operation.
    Failed,
    /// The slot was empty.
    Empty,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
            Outcome::Empty => ExitCode::from(EXIT_EMPTY),
        }
    }
}

/// Store props given as an argument or read from `input`.
pub(crate) async fn set(
    store: &RecoveryPropsStore,
    props: Option<String>,
    input: Option<impl Read>,
) -> Result<Outcome> {
    let props = match (props, input) {
        (Some(p), None) => p,
        (None, Some(mut reader)) => {
            let mut buf = String::new();
            reader
                .read_to_string(&mut buf)
                .context("failed to read props from stdin")?;
            buf
        },
        (Some(_), Some(_)) => bail!("pass props as an argument or with --stdin, not both"),
        (None, None) => bail!("no props given; pass them as an argument or use --stdin"),
    };

    if store.set_recovery_props(&props).await {
        eprintln!("{}", report::stored(store.slot(), props.len()));
        Ok(Outcome::Done)
    } else {
        eprintln!("{}", report::refused("store props in", store.slot()));
        Ok(Outcome::Failed)
    }
}

/// Write the slot's value to `out` and clear it.
pub(crate) async fn consume(store: &RecoveryPropsStore, out: &mut impl Write) -> Result<Outcome> {
    write_value(store, store.consume_recovery_props().await, out)
}

/// Write the slot's value to `out` without clearing it.
pub(crate) async fn show(store: &RecoveryPropsStore, out: &mut impl Write) -> Result<Outcome> {
    write_value(store, store.peek_recovery_props().await, out)
}

fn write_value(
    store: &RecoveryPropsStore,
    value: Option<String>,
    out: &mut impl Write,
) -> Result<Outcome> {
    let Some(props) = value else {
        eprintln!("{}", report::empty(store.slot()));
        return Ok(Outcome::Empty);
    };
    out.write_all(props.as_bytes())
        .and_then(|()| out.flush())
        .context("failed to write props to stdout")?;
    Ok(Outcome::Done)
}

/// Clear the slot, or with `all` every slot in its namespace.
pub(crate) async fn clear(store: &RecoveryPropsStore, all: bool) -> Result<Outcome> {
    if all {
        let removed = store.clear_namespace().await?;
        eprintln!("{}", report::swept(store.slot().namespace(), removed));
        return Ok(Outcome::Done);
    }

    if store.clear_recovery_props().await {
        eprintln!("{}", report::cleared(store.slot()));
        Ok(Outcome::Done)
    } else {
        eprintln!("{}", report::refused("clear", store.slot()));
        Ok(Outcome::Failed)
    }
}

/// List scope ids holding a value under the slot's base key, one per line.
pub(crate) async fn scopes(store: &RecoveryPropsStore, out: &mut impl Write) -> Result<Outcome> {
    let scopes = store.list_scopes().await?;
    if scopes.is_empty() {
        eprintln!("{}", report::no_scopes(store.slot()));
        return Ok(Outcome::Empty);
    }
    for scope in scopes {
        writeln!(out, "{scope}").context("failed to write scopes to stdout")?;
    }
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use keepsake_recovery::RecoverySlot;
    use keepsake_storage::MemoryKvStore;

    use super::*;

    fn store() -> RecoveryPropsStore {
        RecoveryPropsStore::new(Arc::new(MemoryKvStore::new()), RecoverySlot::default())
    }

    #[tokio::test]
    async fn test_set_then_consume() {
        let store = store();
        let outcome = set(&store, Some("crash-report-v1".to_owned()), None::<Cursor<&[u8]>>)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Done);

        let mut out = Vec::new();
        assert_eq!(consume(&store, &mut out).await.unwrap(), Outcome::Done);
        assert_eq!(out, b"crash-report-v1");

        out.clear();
        assert_eq!(consume(&store, &mut out).await.unwrap(), Outcome::Empty);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_output_is_byte_exact() {
        let store = store();
        for value in ["abc", "abc\n", "", "zeile 1\r\nzeile 2 🚑\n\n"] {
            set(&store, None, Some(Cursor::new(value.as_bytes())))
                .await
                .unwrap();
            let mut out = Vec::new();
            show(&store, &mut out).await.unwrap();
            assert_eq!(out, value.as_bytes());
            out.clear();
            consume(&store, &mut out).await.unwrap();
            assert_eq!(out, value.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_set_from_reader() {
        let store = store();
        let input = Cursor::new(b"{\"screen\":\"home\"}".as_slice());
        set(&store, None, Some(input)).await.unwrap();
        assert_eq!(
            store.peek_recovery_props().await.as_deref(),
            Some("{\"screen\":\"home\"}")
        );
    }

    #[tokio::test]
    async fn test_set_requires_exactly_one_source() {
        let store = store();
        assert!(set(&store, None, None::<Cursor<&[u8]>>).await.is_err());
        assert!(
            set(&store, Some("a".to_owned()), Some(Cursor::new(b"b".as_slice())))
                .await
                .is_err()
        );
        assert_eq!(store.peek_recovery_props().await, None);
    }

    #[tokio::test]
    async fn test_show_keeps_value() {
        let store = store();
        store.set_recovery_props("kept").await;
        let mut out = Vec::new();
        assert_eq!(show(&store, &mut out).await.unwrap(), Outcome::Done);
        assert_eq!(show(&store, &mut out).await.unwrap(), Outcome::Done);
        assert_eq!(out, b"keptkept");
        assert_eq!(store.consume_recovery_props().await.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_clear_all_and_scopes() {
        let kv = Arc::new(MemoryKvStore::new());
        let base = RecoveryPropsStore::new(kv.clone(), RecoverySlot::default());
        let scoped =
            RecoveryPropsStore::for_scope(kv.clone(), &RecoverySlot::default(), "w1").unwrap();
        base.set_recovery_props("a").await;
        scoped.set_recovery_props("b").await;

        let mut out = Vec::new();
        assert_eq!(scopes(&base, &mut out).await.unwrap(), Outcome::Done);
        assert_eq!(out, b"w1\n");
        assert_eq!(clear(&base, true).await.unwrap(), Outcome::Done);
        assert_eq!(scopes(&base, &mut out).await.unwrap(), Outcome::Empty);
        assert_eq!(consume(&scoped, &mut out).await.unwrap(), Outcome::Empty);
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(ExitCode::from(Outcome::Done), ExitCode::SUCCESS);
        assert_eq!(ExitCode::from(Outcome::Failed), ExitCode::FAILURE);
        assert_eq!(ExitCode::from(Outcome::Empty), ExitCode::from(EXIT_EMPTY));
    }
}
