use std::io::{self, Write};

use ordered_sequence::OrderedSequence;

use crate::cli::Cli;
use crate::render::{Render, command, log_line};

pub fn run<W: Write>(cli: &Cli, out: &mut W) -> io::Result<()> {
    let seq = OrderedSequence::from_elements(cli.elements.iter().cloned());
    tracing::debug!(len = seq.len(), "sequence built");
    writeln!(out, "{}", command(format!("let seq = {};", cli.elements.render())))?;

    traversals(&seq, out)?;
    collected(&seq, out)?;
    mutations(&seq, out)?;
    seeded(&seq, cli.seed_index, out)?;
    callbacks(&seq, out)?;

    writeln!(out, "{}", command("OrderedSequence::new().to_string()"))?;
    writeln!(out, "{}", OrderedSequence::<String>::new())?;

    let presized: OrderedSequence<String> = OrderedSequence::with_len(cli.presized_len);
    let label = format!("OrderedSequence::with_len({}).len()", cli.presized_len);
    writeln!(out, "{}", command(label))?;
    writeln!(out, "{}", presized.len())?;
    Ok(())
}

fn traversals<W: Write>(seq: &OrderedSequence<String>, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", command("for value in &seq"))?;
    for value in seq {
        writeln!(out, "{}", value.render())?;
    }
    writeln!(out, "{}", command("for (index, value) in seq.entries()"))?;
    for (index, value) in seq.entries() {
        writeln!(out, "{}", log_line(index, &value))?;
    }
    writeln!(out, "{}", command("for index in seq.keys()"))?;
    for index in seq.keys() {
        writeln!(out, "{index}")?;
    }
    writeln!(out, "{}", command("for value in seq.values()"))?;
    for value in seq.values() {
        writeln!(out, "{}", value.render())?;
    }
    writeln!(out, "{}", command("for value in seq.reverse_iterator()"))?;
    for value in seq.reverse_iterator() {
        writeln!(out, "{}", value.render())?;
    }
    writeln!(out, "{}", command("for (index, value) in seq.entries().reverse_iterator()"))?;
    for (index, value) in seq.entries().reverse_iterator() {
        writeln!(out, "{}", log_line(index, &value))?;
    }
    writeln!(out, "{}", command("for index in seq.keys().reverse_iterator()"))?;
    for index in seq.keys().reverse_iterator() {
        writeln!(out, "{index}")?;
    }
    writeln!(out, "{}", command("for value in seq.values().reverse_iterator()"))?;
    for value in seq.values().reverse_iterator() {
        writeln!(out, "{}", value.render())?;
    }
    Ok(())
}

fn collected<W: Write>(seq: &OrderedSequence<String>, out: &mut W) -> io::Result<()> {
    let lines = [
        ("seq.values().collect()", seq.values().collect::<Vec<_>>().render()),
        ("seq.entries().collect()", seq.entries().collect::<Vec<_>>().render()),
        ("seq.keys().collect()", seq.keys().collect::<Vec<_>>().render()),
        (
            "seq.reverse_iterator().collect()",
            seq.reverse_iterator().collect::<Vec<_>>().render(),
        ),
        (
            "seq.entries().into_reverse().collect()",
            seq.entries().into_reverse().collect::<Vec<_>>().render(),
        ),
        (
            "seq.keys().into_reverse().collect()",
            seq.keys().into_reverse().collect::<Vec<_>>().render(),
        ),
    ];
    for (label, rendered) in lines {
        writeln!(out, "{}", command(label))?;
        writeln!(out, "{rendered}")?;
    }
    Ok(())
}

fn mutations<W: Write>(seq: &OrderedSequence<String>, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", command("seq.len()"))?;
    writeln!(out, "{}", seq.len())?;

    writeln!(out, "{}", command("seq.splice(1, 1, [])"))?;
    let removed = seq.splice(1, 1, []);
    writeln!(out, "{}", removed.to_vec().render())?;

    writeln!(out, "{}", command("seq.len()"))?;
    writeln!(out, "{}", seq.len())?;

    writeln!(out, "{}", command(r#"seq.append(["4", "5", "6"])"#))?;
    let len = seq.append(["4", "5", "6"].map(String::from));
    writeln!(out, "{len}")?;

    writeln!(out, "{}", command("seq.values().collect()"))?;
    writeln!(out, "{}", seq.values().collect::<Vec<_>>().render())?;
    Ok(())
}

fn seeded<W: Write>(seq: &OrderedSequence<String>, seed: usize, out: &mut W) -> io::Result<()> {
    let label = format!("let mut it = seq.iterator_for({seed}).into_reverse();");
    writeln!(out, "{}", command(label))?;
    let mut it = seq.iterator_for(seed).into_reverse();
    tracing::debug!(start = ?it.start_index(), last = ?it.last_index(), "seeded iterator");
    // Stops after printing the first exhausted result.
    loop {
        writeln!(out, "{}", command("it.next()"))?;
        let step = it.next();
        writeln!(out, "{}", step.render())?;
        if step.is_none() {
            return Ok(());
        }
    }
}

fn callbacks<W: Write>(seq: &OrderedSequence<String>, out: &mut W) -> io::Result<()> {
    let mut lines = Vec::new();
    seq.for_each(|value, index, _| lines.push(log_line(index, &value)));
    writeln!(out, "{}", command("seq.for_each(|value, index, _| ...)"))?;
    for line in lines.drain(..) {
        writeln!(out, "{line}")?;
    }

    seq.for_each_reverse_with(&mut lines, |this, value, index, _| {
        this.push(log_line(index, &value));
    });
    writeln!(out, "{}", command("seq.for_each_reverse(|value, index, _| ...)"))?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
