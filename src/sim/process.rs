// Copyright (c) 2017-2021 Fabian Schuiki

//! Process execution.
//!
//! This module implements the virtual machine that executes process programs.
//! A process binds a shared, immutable program to a set of input and output
//! signals and owns its register file, program counter, and state.

use crate::{
    sim::{
        ArithOp, CmpOp, Event, LogicOp, Program, ProgInst, RegId, SignalRef, SimSignal, SimTime,
        CONST_BIT,
    },
    value::LogicValue,
};
use log::{error, trace};
use std::{fmt, sync::Arc};

/// A unique reference to a process in a simulation.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct ProcessRef(pub(crate) usize);

impl ProcessRef {
    /// Create a new process reference.
    pub fn new(id: usize) -> ProcessRef {
        ProcessRef(id)
    }
}

/// The state a process can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// The process will run in the current delta step.
    Ready,
    /// The process is currently executing instructions.
    Running,
    /// The process has yielded but will resume in the current delta step.
    Suspended,
    /// The process waits for a fixed point in time.
    WaitTime,
    /// The process waits for one of its input signals to change.
    WaitInputs,
    /// The process hit a fault and will not run again.
    Stopped,
}

/// A fault that stops the offending process.
#[derive(Debug)]
enum Fault {
    BadRegister(RegId),
    BadInput(u16),
    BadOutput(u16),
    BadJump(usize),
    WidthMismatch(usize, usize),
    UndefinedCondition,
    DivisionByZero,
    InvalidInstruction,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Fault::BadRegister(id) => write!(f, "operand id {:#06x} out of range", id),
            Fault::BadInput(i) => write!(f, "input index {} out of range", i),
            Fault::BadOutput(i) => write!(f, "output index {} out of range", i),
            Fault::BadJump(t) => write!(f, "jump target {} out of range", t),
            Fault::WidthMismatch(a, b) => write!(f, "operand widths {} and {} must match", a, b),
            Fault::UndefinedCondition => write!(f, "branch condition is undefined"),
            Fault::DivisionByZero => write!(f, "division by zero"),
            Fault::InvalidInstruction => write!(f, "invalid instruction"),
        }
    }
}

/// A process instance.
pub struct Process {
    /// The program this process executes.
    program: Arc<Program>,
    /// The program counter.
    pc: usize,
    /// The current state.
    state: ProcessState,
    /// The flat register file.
    regs: Vec<u8>,
    /// The byte offset of each register in the file.
    reg_offsets: Vec<usize>,
    /// The signals bound to the program's input schedule.
    inputs: Vec<SignalRef>,
    /// The signals bound to the program's output schedule.
    outputs: Vec<SignalRef>,
    /// The time a `WaitTime` suspension runs out.
    wait_time: SimTime,
}

impl Process {
    /// Create a new process bound to a program and a set of signals.
    ///
    /// The bindings are assumed to have been width-checked against the
    /// program's input and output schedules.
    pub fn new(program: Arc<Program>, inputs: Vec<SignalRef>, outputs: Vec<SignalRef>) -> Process {
        let mut reg_offsets = Vec::with_capacity(program.registers.len());
        let mut total = 0;
        for &len in &program.registers {
            reg_offsets.push(total);
            total += len;
        }
        Process {
            program,
            pc: 0,
            state: ProcessState::Ready,
            regs: vec![b'U'; total],
            reg_offsets,
            inputs,
            outputs,
            wait_time: SimTime::ZERO,
        }
    }

    /// Get the process's current state.
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Get the time a `WaitTime` suspension runs out.
    pub fn wait_time(&self) -> SimTime {
        self.wait_time
    }

    /// Get the process's input signal bindings.
    pub fn inputs(&self) -> &[SignalRef] {
        &self.inputs
    }

    /// Get the process's output signal bindings.
    pub fn outputs(&self) -> &[SignalRef] {
        &self.outputs
    }

    /// Make the process ready.
    ///
    /// Called by the kernel when one of the process's input signals changed.
    pub(crate) fn wake(&mut self) {
        self.state = ProcessState::Ready;
    }

    /// Run the process until it suspends.
    ///
    /// Returns the events the process staged; the caller adds them to the
    /// event queue. A process that runs off the end of its program becomes
    /// `Ready` again with the program counter reset to zero.
    pub fn run(&mut self, signals: &[SimSignal], now: SimTime) -> Vec<Event> {
        match self.state {
            ProcessState::Ready | ProcessState::Suspended => self.state = ProcessState::Running,
            ProcessState::WaitTime => {
                if now >= self.wait_time {
                    self.state = ProcessState::Running;
                }
            }
            ProcessState::Running | ProcessState::WaitInputs | ProcessState::Stopped => (),
        }
        let mut events = Vec::new();
        while self.state == ProcessState::Running {
            if self.pc == self.program.insts.len() {
                self.state = ProcessState::Ready;
                self.pc = 0;
                break;
            }
            let pc = self.pc;
            self.pc += 1;
            let inst = self.program.insts[pc].clone();
            trace!("exec #{} {:?}", pc, inst);
            if let Err(fault) = self.exec(&inst, signals, now, &mut events) {
                error!("process stopped at #{}: {}", pc, fault);
                self.state = ProcessState::Stopped;
            }
        }
        events
    }

    /// Execute a single instruction.
    fn exec(
        &mut self,
        inst: &ProgInst,
        signals: &[SimSignal],
        now: SimTime,
        events: &mut Vec<Event>,
    ) -> Result<(), Fault> {
        match *inst {
            ProgInst::Input { rd, input } => {
                let signal = *self
                    .inputs
                    .get(input as usize)
                    .ok_or(Fault::BadInput(input))?;
                let bytes = signals[signal.as_usize()].value().as_bytes().to_vec();
                let (off, len) = self.lval(rd)?;
                if len != bytes.len() {
                    return Err(Fault::WidthMismatch(len, bytes.len()));
                }
                self.regs[off..off + len].copy_from_slice(&bytes);
            }
            ProgInst::Output { output, ra, delay } => {
                let signal = *self
                    .outputs
                    .get(output as usize)
                    .ok_or(Fault::BadOutput(output))?;
                let want = self
                    .program
                    .outputs
                    .get(output as usize)
                    .ok_or(Fault::BadOutput(output))?
                    .width;
                let bytes = self.rval(ra)?;
                if bytes.len() != want {
                    return Err(Fault::WidthMismatch(bytes.len(), want));
                }
                let value =
                    LogicValue::try_from_bytes(&bytes).ok_or(Fault::InvalidInstruction)?;
                let time = if delay == 0 {
                    now.adv_delta()
                } else {
                    now.adv_time(delay)
                };
                events.push(Event::new(time, signal, value));
            }
            ProgInst::Move { rd, ra } => {
                let bytes = self.rval(ra)?;
                let (off, len) = self.lval(rd)?;
                if len != bytes.len() {
                    return Err(Fault::WidthMismatch(len, bytes.len()));
                }
                self.regs[off..off + len].copy_from_slice(&bytes);
            }
            ProgInst::WaitTime { ra } => {
                let bytes = self.rval(ra)?;
                if bytes.len() != 8 {
                    return Err(Fault::WidthMismatch(bytes.len(), 8));
                }
                let mut raw = [0; 8];
                raw.copy_from_slice(&bytes);
                self.wait_time = now.adv_time(u64::from_le_bytes(raw));
                self.state = ProcessState::WaitTime;
            }
            ProgInst::WaitInputs => {
                self.state = ProcessState::WaitInputs;
            }
            ProgInst::UnaryLogic { op, n, rd, ra } => {
                if op != LogicOp::Neg {
                    return Err(Fault::InvalidInstruction);
                }
                let a = self.rval(ra)?;
                let (off, len) = self.lval(rd)?;
                if len != a.len() || n != a.len() {
                    return Err(Fault::WidthMismatch(len, a.len()));
                }
                let a = LogicValue::try_from_bytes(&a).ok_or(Fault::InvalidInstruction)?;
                let result = a.not();
                self.regs[off..off + len].copy_from_slice(result.as_bytes());
            }
            ProgInst::BinaryLogic { op, n, rd, ra, rb } => {
                let a = self.rval(ra)?;
                let b = self.rval(rb)?;
                let (off, len) = self.lval(rd)?;
                if len != a.len() || a.len() != b.len() || n != a.len() {
                    return Err(Fault::WidthMismatch(a.len(), b.len()));
                }
                let a = LogicValue::try_from_bytes(&a).ok_or(Fault::InvalidInstruction)?;
                let b = LogicValue::try_from_bytes(&b).ok_or(Fault::InvalidInstruction)?;
                let result = match op {
                    LogicOp::And => a.and(&b),
                    LogicOp::Or => a.or(&b),
                    LogicOp::Xor => a.xor(&b),
                    LogicOp::Neg => return Err(Fault::InvalidInstruction),
                };
                self.regs[off..off + len].copy_from_slice(result.as_bytes());
            }
            ProgInst::BinaryArith { op, n, rd, ra, rb } => {
                let a = self.rval(ra)?;
                let b = self.rval(rb)?;
                let (off, len) = self.lval(rd)?;
                if len != a.len() || a.len() != b.len() || n != a.len() {
                    return Err(Fault::WidthMismatch(a.len(), b.len()));
                }
                let a = LogicValue::try_from_bytes(&a).ok_or(Fault::InvalidInstruction)?;
                let b = LogicValue::try_from_bytes(&b).ok_or(Fault::InvalidInstruction)?;
                let result = match (a.to_int(), b.to_int()) {
                    (Some(a), Some(b)) => {
                        if op == ArithOp::Udiv && b.is_zero() {
                            return Err(Fault::DivisionByZero);
                        }
                        let r = match op {
                            ArithOp::Add => a.add(&b),
                            ArithOp::Sub => a.sub(&b),
                            ArithOp::Mul => a.mul(&b),
                            ArithOp::Udiv => a.udiv(&b),
                        };
                        LogicValue::from_int(&r)
                    }
                    _ => LogicValue::all_x(n),
                };
                self.regs[off..off + len].copy_from_slice(result.as_bytes());
            }
            ProgInst::Compare { op, n, rd, ra, rb } => {
                let a = self.rval(ra)?;
                let b = self.rval(rb)?;
                let (off, len) = self.lval(rd)?;
                if len != 1 {
                    return Err(Fault::WidthMismatch(len, 1));
                }
                if a.len() != b.len() || n != a.len() {
                    return Err(Fault::WidthMismatch(a.len(), b.len()));
                }
                let a = LogicValue::try_from_bytes(&a).ok_or(Fault::InvalidInstruction)?;
                let b = LogicValue::try_from_bytes(&b).ok_or(Fault::InvalidInstruction)?;
                self.regs[off] = match (a.to_int(), b.to_int()) {
                    (Some(a), Some(b)) => {
                        let r = match op {
                            CmpOp::Eq => a.eq(&b),
                            CmpOp::Ne => a.ne(&b),
                            CmpOp::Ult => a.ult(&b),
                            CmpOp::Ugt => a.ugt(&b),
                            CmpOp::Ule => a.ule(&b),
                            CmpOp::Uge => a.uge(&b),
                        };
                        if r {
                            b'1'
                        } else {
                            b'0'
                        }
                    }
                    _ => b'X',
                };
            }
            ProgInst::Jump { target } => {
                if target > self.program.insts.len() {
                    return Err(Fault::BadJump(target));
                }
                self.pc = target;
            }
            ProgInst::BranchIf { cond, target } => {
                if target > self.program.insts.len() {
                    return Err(Fault::BadJump(target));
                }
                let c = self.rval(cond)?;
                if c.len() != 1 {
                    return Err(Fault::WidthMismatch(c.len(), 1));
                }
                match LogicValue::lane_bool(c[0]) {
                    Some(true) => self.pc = target,
                    Some(false) => (),
                    None => return Err(Fault::UndefinedCondition),
                }
            }
        }
        Ok(())
    }

    /// Resolve an operand id to its bytes, in either the register file or the
    /// constants pool.
    fn rval(&self, id: RegId) -> Result<Vec<u8>, Fault> {
        if id & CONST_BIT != 0 {
            let slot = self
                .program
                .const_slots
                .get((id & !CONST_BIT) as usize)
                .ok_or(Fault::BadRegister(id))?;
            Ok(self.program.constants[slot.offset..slot.offset + slot.len].to_vec())
        } else {
            let (off, len) = self.lval(id)?;
            Ok(self.regs[off..off + len].to_vec())
        }
    }

    /// Resolve an operand id to a register's offset and length.
    fn lval(&self, id: RegId) -> Result<(usize, usize), Fault> {
        if id & CONST_BIT != 0 {
            return Err(Fault::BadRegister(id));
        }
        let len = *self
            .program
            .registers
            .get(id as usize)
            .ok_or(Fault::BadRegister(id))?;
        Ok((self.reg_offsets[id as usize], len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ProgArgKind, Program};

    fn run_once(program: Program, signals: &[SimSignal]) -> (Process, Vec<Event>) {
        let inputs = (0..program.inputs.len()).map(SignalRef::new).collect();
        let outputs = (0..program.outputs.len())
            .map(|i| SignalRef::new(program.inputs.len() + i))
            .collect();
        let mut process = Process::new(Arc::new(program), inputs, outputs);
        let events = process.run(signals, SimTime::ZERO);
        (process, events)
    }

    #[test]
    fn arithmetic_on_logic() {
        let mut b = Program::build();
        let r0 = b.register(8);
        let three = b.constant_logic("00000011");
        let one = b.constant_logic("00000001");
        let out = b.output(ProgArgKind::Logic, 8);
        b.inst(ProgInst::BinaryArith {
            op: ArithOp::Add,
            n: 8,
            rd: r0,
            ra: three,
            rb: one,
        });
        b.inst(ProgInst::Output {
            output: out,
            ra: r0,
            delay: 0,
        });
        let (process, events) = run_once(b.finish(), &[SimSignal::new(LogicValue::undef(8))]);
        assert_eq!(process.state(), ProcessState::Ready);
        assert_eq!(events.len(), 1);
        assert_eq!(format!("{}", events[0].value), "00000100");
        assert_eq!(events[0].time, SimTime::ZERO.adv_delta());
    }

    #[test]
    fn arithmetic_with_undefined_lane() {
        let mut b = Program::build();
        let r0 = b.register(8);
        let a = b.constant_logic("000000X1");
        let one = b.constant_logic("00000001");
        b.inst(ProgInst::BinaryArith {
            op: ArithOp::Add,
            n: 8,
            rd: r0,
            ra: a,
            rb: one,
        });
        let (process, _) = run_once(b.finish(), &[]);
        assert_eq!(process.state(), ProcessState::Ready);
        assert_eq!(&process.regs[..8], b"XXXXXXXX");
    }

    #[test]
    fn compare_and_branch() {
        let mut b = Program::build();
        let rc = b.register(1);
        let r0 = b.register(4);
        let a = b.constant_logic("0011");
        let c = b.constant_logic("0100");
        // r0 starts out undefined; the branch skips the move that would
        // define it.
        b.inst(ProgInst::Compare {
            op: CmpOp::Ult,
            n: 4,
            rd: rc,
            ra: a,
            rb: c,
        });
        b.inst(ProgInst::BranchIf { cond: rc, target: 3 });
        b.inst(ProgInst::Move { rd: r0, ra: a });
        let (process, _) = run_once(b.finish(), &[]);
        assert_eq!(process.state(), ProcessState::Ready);
        assert_eq!(&process.regs[1..5], b"UUUU");
    }

    #[test]
    fn width_mismatch_stops_process() {
        let mut b = Program::build();
        let r0 = b.register(4);
        let a = b.constant_logic("00000001");
        b.inst(ProgInst::Move { rd: r0, ra: a });
        let (process, _) = run_once(b.finish(), &[]);
        assert_eq!(process.state(), ProcessState::Stopped);
    }

    #[test]
    fn wait_time_sets_deadline() {
        let mut b = Program::build();
        let t = b.constant_time(4000);
        b.inst(ProgInst::WaitTime { ra: t });
        let (process, _) = run_once(b.finish(), &[]);
        assert_eq!(process.state(), ProcessState::WaitTime);
        assert_eq!(process.wait_time(), SimTime::new(4000, 0));
    }
}
