use nalgebra::{Matrix3, Point2};
use std::{cell::RefCell, rc::Rc};

use super::{DrawState, Filter, Shadow, StateStack, Surface};
use crate::color::{Rgb, Rgba};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Circle {
        center: Point2<f64>,
        radius: f64,
        color: Rgb,
        transform: Matrix3<f64>,
        alpha: f64,
        shadow: Shadow,
        filter: Filter,
    },
    Fill(Rgba),
    Clear,
    Present,
    Resize(u32, u32),
}

impl DrawOp {
    /// Device-space center of a circle.
    pub fn device_center(&self) -> Option<Point2<f64>> {
        match self {
            DrawOp::Circle {
                center, transform, ..
            } => Some(transform.transform_point(center)),
            _ => None,
        }
    }

    /// Where a circle's shadow lands in device space.
    pub fn shadow_center(&self) -> Option<Point2<f64>> {
        match self {
            DrawOp::Circle { shadow, .. } => self.device_center().map(|c| c + shadow.offset),
            _ => None,
        }
    }
}

/// Offscreen surface that keeps a log of draw calls. The log is shared, so a
/// handle can be kept after the surface is boxed away.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    state: StateStack,
    ops: Rc<RefCell<Vec<DrawOp>>>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> RecordingSurface {
        RecordingSurface {
            width,
            height,
            state: StateStack::default(),
            ops: Rc::new(RefCell::new(vec![])),
        }
    }

    pub fn log(&self) -> DrawLog {
        DrawLog {
            ops: Rc::clone(&self.ops),
        }
    }

    fn push(&self, op: DrawOp) {
        self.ops.borrow_mut().push(op);
    }
}

#[derive(Clone, Debug)]
pub struct DrawLog {
    ops: Rc<RefCell<Vec<DrawOp>>>,
}

impl DrawLog {
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.borrow().clone()
    }

    pub fn take(&self) -> Vec<DrawOp> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    pub fn circles(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.state.reset();
        self.push(DrawOp::Resize(width, height));
    }

    fn state(&self) -> &StateStack {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StateStack {
        &mut self.state
    }

    fn fill_circle(&mut self, center: Point2<f64>, radius: f64, color: Rgb) {
        let DrawState {
            transform,
            alpha,
            shadow,
            filter,
        } = *self.state.current();
        self.push(DrawOp::Circle {
            center,
            radius,
            color,
            transform,
            alpha,
            shadow,
            filter,
        });
    }

    fn fill_rect(&mut self, color: Rgba) {
        self.push(DrawOp::Fill(color));
    }

    fn clear(&mut self) {
        self.push(DrawOp::Clear);
    }

    fn present(&mut self) {
        self.push(DrawOp::Present);
    }
}
