use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};
use worldmap_world::World;

use crate::error::IngestError;
use crate::event::{ChunkResponse, IngestEvent};
use crate::packet::UpstreamPacket;
use crate::relay::UpstreamRelay;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Drives one upstream relay connection for the lifetime of the process,
/// reconnecting with exponential backoff (1s initial, 30s cap, unbounded
/// attempts) per §4.7. Does not flush `world` across reconnects -- the
/// world-reset event is the sole trigger for that, matching the upstream
/// protocol's own `world-reset` semantics.
pub async fn run_session<R: UpstreamRelay>(
    mut relay: R,
    mut world: World,
    events: Sender<IngestEvent>,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match relay.connect().await {
            Ok(()) => {
                backoff = INITIAL_BACKOFF;
                info!("upstream connected");
                if events
                    .send(IngestEvent::ConnectionStatus { connected: true, player_id: None, message: None })
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, backoff_ms = backoff.as_millis(), "upstream connect failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        }

        loop {
            match relay.recv().await {
                Ok(packet) => {
                    if handle_packet(&mut world, &events, packet).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "upstream read failed, reconnecting");
                    let _ = events
                        .send(IngestEvent::ConnectionStatus {
                            connected: false,
                            player_id: None,
                            message: Some(e.to_string()),
                        })
                        .await;
                    break;
                }
            }
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Applies one upstream packet to `world` and forwards any resulting
/// `IngestEvent`s. Returns `Err` only if the outbound channel has closed,
/// which the caller treats as a shutdown signal.
async fn handle_packet(
    world: &mut World,
    events: &Sender<IngestEvent>,
    packet: UpstreamPacket,
) -> Result<(), IngestError> {
    match packet {
        UpstreamPacket::Join { protocol_version } => {
            debug!(protocol_version, "upstream join");
            Ok(())
        }
        UpstreamPacket::StartGame { world_seed } => {
            debug!(world_seed, "upstream start_game");
            Ok(())
        }
        UpstreamPacket::ClientCacheMissResponse { key, .. } => {
            debug!(%key, "client cache miss response, ignoring (no disk cache kept)");
            Ok(())
        }
        UpstreamPacket::LevelChunk { key, sub_chunk_count, sections } => {
            let errors = world.on_level_chunk(key, sub_chunk_count, sections);
            for error in &errors {
                warn!(%key, %error, "level_chunk section decode failed");
            }
            emit_dirty(world, events).await
        }
        UpstreamPacket::Subchunk { origin_key, entries } => {
            world.on_subchunk(origin_key, entries);
            emit_dirty(world, events).await
        }
        UpstreamPacket::UpdateBlock { position, new_state } => {
            world.on_update_block(position, new_state);
            emit_dirty(world, events).await
        }
        UpstreamPacket::PlayerAuthInput { pose } => {
            events
                .send(IngestEvent::PlayerPosition(pose))
                .await
                .map_err(|_| IngestError::ChannelClosed)
        }
        UpstreamPacket::WorldReset => {
            world.on_world_reset();
            events
                .send(IngestEvent::WorldReset)
                .await
                .map_err(|_| IngestError::ChannelClosed)
        }
    }
}

/// Drains `world`'s dirty-key queue and emits a fresh `ChunkResponse` per
/// key. This is how a targeted `on_update_block` write -- which has no
/// dedicated event in §4.7 -- reaches the tile service: any column whose
/// surface changed is simply re-sent as `chunk-data`.
async fn emit_dirty(world: &mut World, events: &Sender<IngestEvent>) -> Result<(), IngestError> {
    let dirty = world.take_dirty_keys();
    if dirty.is_empty() {
        return Ok(());
    }

    let responses = dirty
        .into_iter()
        .map(|key| match world.get_column(key) {
            Some(column) => ChunkResponse::ok(key, column.clone()),
            None => ChunkResponse::failed(key),
        })
        .collect();

    events
        .send(IngestEvent::ChunkData(responses))
        .await
        .map_err(|_| IngestError::ChannelClosed)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use worldmap_proto::Dimension;

    use super::*;

    struct ScriptedRelay {
        packets: std::collections::VecDeque<UpstreamPacket>,
        connect_calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl UpstreamRelay for ScriptedRelay {
        async fn connect(&mut self) -> Result<(), IngestError> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn recv(&mut self) -> Result<UpstreamPacket, IngestError> {
            self.packets
                .pop_front()
                .ok_or_else(|| IngestError::Disconnected("script exhausted".to_owned()))
        }
    }

    #[tokio::test]
    async fn level_chunk_emits_chunk_data() {
        let key = ChunkKey::new(0, 0, Dimension::Overworld);
        let relay = ScriptedRelay {
            packets: std::collections::VecDeque::from([UpstreamPacket::LevelChunk {
                key,
                sub_chunk_count: -1,
                sections: vec![],
            }]),
            connect_calls: Arc::new(AtomicUsize::new(0)),
        };

        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let handle = tokio::spawn(run_session(relay, World::new(), tx));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, IngestEvent::ConnectionStatus { connected: true, .. }));

        let second = rx.recv().await.unwrap();
        match second {
            IngestEvent::ChunkData(responses) => {
                assert_eq!(responses.len(), 1);
                assert_eq!(responses[0].key, key);
                assert!(responses[0].success);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        drop(rx);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn world_reset_packet_forwards_event_and_clears_world() {
        let relay = ScriptedRelay {
            packets: std::collections::VecDeque::from([UpstreamPacket::WorldReset]),
            connect_calls: Arc::new(AtomicUsize::new(0)),
        };

        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let handle = tokio::spawn(run_session(relay, World::new(), tx));

        let _connected = rx.recv().await.unwrap();
        let reset = rx.recv().await.unwrap();
        assert!(matches!(reset, IngestEvent::WorldReset));

        drop(rx);
        let _ = handle.await;
    }
}
