//! End-to-end canonicalization of temporal expressions inside a module.

use ferrite_ir::dialect::{DialectOp, canonicalization_patterns, hw, ltl, verif};
use ferrite_ir::printer::print_program;
use ferrite_ir::rewrite::{ApplyResult, PatternApplicator};
use ferrite_ir::{Location, Module, ModuleKind, Program, Symbol, Type, validate_program};

fn setup(ports: usize) -> (Program, Module, Location) {
    let mut program = Program::new();
    let loc = program.location("canon.fir");
    let circuit = program.add_circuit(Symbol::new("Top"), loc);
    let module = circuit
        .add_module(
            &mut program.ctx,
            Symbol::new("Top"),
            ModuleKind::Design,
            vec![Type::bool(); ports],
            loc,
        )
        .unwrap();
    (program, module, loc)
}

fn canonicalize(program: &mut Program, module: Module) -> ApplyResult {
    let bound = module.op_count(&program.ctx) + 1;
    let region = module.body(&program.ctx);
    PatternApplicator::new()
        .with_patterns(canonicalization_patterns())
        .with_max_iterations(bound)
        .apply_region(&mut program.ctx, region)
}

#[test]
fn nested_delays_collapse() {
    let (mut program, top, loc) = setup(1);
    let ctx = &mut program.ctx;
    let a = top.ports(ctx)[0];
    let d1 = ltl::delay(ctx, loc, a, 1, Some(0));
    let v1 = d1.result(ctx);
    let d2 = ltl::delay(ctx, loc, v1, 2, Some(0));
    let v2 = d2.result(ctx);
    let check = verif::assert(ctx, loc, v2, None);
    for op in [d1.op_ref(), d2.op_ref(), check.op_ref()] {
        top.append(ctx, op);
    }

    let result = canonicalize(&mut program, top);
    assert!(result.reached_fixpoint);
    assert!(validate_program(&program).is_ok());
    insta::assert_snapshot!(print_program(&program), @r"
    hw.circuit @Top {
      hw.module<design> @Top(%arg0: i1) {
        %0 = ltl.delay %arg0 {delay = 3, length = 0} : ltl.sequence
        verif.assert %0
      }
    }
    ");
}

#[test]
fn cast_is_pushed_below_not() {
    let (mut program, top, loc) = setup(1);
    let ctx = &mut program.ctx;
    let a = top.ports(ctx)[0];
    let not = ltl::not(ctx, loc, a);
    let nv = not.result(ctx);
    let cast = ltl::cast_to_prop(ctx, loc, nv);
    let cv = cast.result(ctx);
    let check = verif::assert(ctx, loc, cv, None);
    for op in [not.op_ref(), cast.op_ref(), check.op_ref()] {
        top.append(ctx, op);
    }

    let result = canonicalize(&mut program, top);
    assert!(result.reached_fixpoint);
    insta::assert_snapshot!(print_program(&program), @r"
    hw.circuit @Top {
      hw.module<design> @Top(%arg0: i1) {
        %0 = ltl.cast_to_prop %arg0 : ltl.property
        %1 = ltl.not %0 : ltl.property
        verif.assert %1
      }
    }
    ");
}

#[test]
fn concat_flattening_is_idempotent() {
    let (mut program, top, loc) = setup(3);
    let ctx = &mut program.ctx;
    let ports = top.ports(ctx).to_vec();
    let inner = ltl::concat(ctx, loc, [ports[0], ports[1]]);
    let iv = inner.result(ctx);
    let outer = ltl::concat(ctx, loc, [iv, ports[2]]);
    let ov = outer.result(ctx);
    let delayed = ltl::delay(ctx, loc, ov, 1, Some(0));
    let dv = delayed.result(ctx);
    let cover = verif::cover(ctx, loc, dv, None);
    for op in [
        inner.op_ref(),
        outer.op_ref(),
        delayed.op_ref(),
        cover.op_ref(),
    ] {
        top.append(ctx, op);
    }

    let first = canonicalize(&mut program, top);
    assert!(first.reached_fixpoint);
    assert!(first.total_changes > 0);
    let printed = print_program(&program);
    insta::assert_snapshot!(printed, @r"
    hw.circuit @Top {
      hw.module<design> @Top(%arg0: i1, %arg1: i1, %arg2: i1) {
        %0 = ltl.delay %arg0 {delay = 1, length = 0} : ltl.sequence
        %1 = ltl.concat %0, %arg1, %arg2 : ltl.sequence
        verif.cover %1
      }
    }
    ");

    let second = canonicalize(&mut program, top);
    assert_eq!(
        second,
        ApplyResult {
            iterations: 1,
            total_changes: 0,
            reached_fixpoint: true,
        }
    );
    assert_eq!(print_program(&program), printed);
}

#[test]
fn disable_on_false_folds_away() {
    let (mut program, top, loc) = setup(1);
    let ctx = &mut program.ctx;
    let a = top.ports(ctx)[0];
    let prop = ltl::cast_to_prop(ctx, loc, a);
    let pv = prop.result(ctx);
    let zero = hw::constant(ctx, loc, 1, 0);
    let zv = zero.result(ctx);
    let disable = ltl::disable(ctx, loc, pv, zv);
    let dv = disable.result(ctx);
    let check = verif::assert(ctx, loc, dv, None);
    for op in [
        prop.op_ref(),
        zero.op_ref(),
        disable.op_ref(),
        check.op_ref(),
    ] {
        top.append(ctx, op);
    }

    let result = canonicalize(&mut program, top);
    assert!(result.reached_fixpoint);
    insta::assert_snapshot!(print_program(&program), @r"
    hw.circuit @Top {
      hw.module<design> @Top(%arg0: i1) {
        %0 = ltl.cast_to_prop %arg0 : ltl.property
        verif.assert %0
      }
    }
    ");
}

#[test]
fn identities_fold_to_their_input() {
    let (mut program, top, loc) = setup(1);
    let ctx = &mut program.ctx;
    let a = top.ports(ctx)[0];
    let seq = ltl::delay(ctx, loc, a, 1, None);
    let sv = seq.result(ctx);
    let once = ltl::repeat(ctx, loc, sv, 1, Some(0));
    let ov = once.result(ctx);
    let single = ltl::concat(ctx, loc, [ov]);
    let cv = single.result(ctx);
    let p = ltl::cast_to_prop(ctx, loc, cv);
    let pv = p.result(ctx);
    let again = ltl::cast_to_prop(ctx, loc, pv);
    let av = again.result(ctx);
    let check = verif::assert(ctx, loc, av, None);
    for op in [
        seq.op_ref(),
        once.op_ref(),
        single.op_ref(),
        p.op_ref(),
        again.op_ref(),
        check.op_ref(),
    ] {
        top.append(ctx, op);
    }

    let result = canonicalize(&mut program, top);
    assert!(result.reached_fixpoint);
    insta::assert_snapshot!(print_program(&program), @r"
    hw.circuit @Top {
      hw.module<design> @Top(%arg0: i1) {
        %0 = ltl.delay %arg0 {delay = 1} : ltl.sequence
        %1 = ltl.cast_to_prop %0 : ltl.property
        verif.assert %1
      }
    }
    ");
}

#[test]
fn long_delay_chain_terminates_within_bound() {
    let (mut program, top, loc) = setup(1);
    let ctx = &mut program.ctx;
    let mut value = top.ports(ctx)[0];
    for _ in 0..16 {
        let d = ltl::delay(ctx, loc, value, 1, Some(1));
        top.append(ctx, d.op_ref());
        value = d.result(ctx);
    }
    let check = verif::assert(ctx, loc, value, None);
    top.append(ctx, check.op_ref());

    let result = canonicalize(&mut program, top);
    assert!(result.reached_fixpoint);
    assert!(validate_program(&program).is_ok());

    let ops = top.ops(&program.ctx);
    assert_eq!(ops.len(), 2);
    let merged = ltl::Delay::from_op(&program.ctx, ops[0]).unwrap();
    assert_eq!(merged.delay(&program.ctx), 16);
    assert_eq!(merged.length(&program.ctx), Some(16));
}

#[test]
fn until_over_two_sequences_becomes_a_property() {
    let (mut program, top, loc) = setup(2);
    let ctx = &mut program.ctx;
    let ports = top.ports(ctx).to_vec();
    let until = ltl::until(ctx, loc, ports[0], ports[1]);
    let uv = until.result(ctx);
    let cast = ltl::cast_to_prop(ctx, loc, uv);
    let cv = cast.result(ctx);
    let check = verif::assert(ctx, loc, cv, None);
    for op in [until.op_ref(), cast.op_ref(), check.op_ref()] {
        top.append(ctx, op);
    }

    let result = canonicalize(&mut program, top);
    assert!(result.reached_fixpoint);
    assert!(validate_program(&program).is_ok());

    let ctx = &program.ctx;
    let ops = top.ops(ctx);
    assert_eq!(ops.len(), 4);
    let rebuilt = ops
        .iter()
        .find_map(|&op| ltl::Until::from_op(ctx, op).ok())
        .unwrap();
    let operands = [rebuilt.input(ctx), rebuilt.condition(ctx)];
    for (operand, port) in operands.iter().zip(&ports) {
        let cast = ltl::CastToProp::from_op(ctx, ctx.defining_op(*operand).unwrap()).unwrap();
        assert_eq!(cast.input(ctx), *port);
    }
    let ty = ctx.value_ty(rebuilt.result(ctx));
    assert_eq!(ty, Type::Property);
    assert_eq!(ty, ltl::connective_type(ctx, &operands));
}
