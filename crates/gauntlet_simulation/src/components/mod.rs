//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: здоровье, guard meter, player health pool, маркер цели
//!
//! Боевое состояние врага (`Combatant`) живёт в `ai`, tactical-layer
//! компоненты (`NavAgent`) — в `bridge`.

pub mod actor;

pub use actor::*;
