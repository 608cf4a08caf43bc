use ajax::{
    AjaxError, AjaxRequestTarget, BufferedWebResponse, Component, ComponentRef, Page, PageRef,
    RequestCycle, Response,
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::cell::RefCell;
use std::rc::Rc;

const COMPONENTS: usize = 200;

struct NullPage;

impl Page for NullPage {
    fn detach(&mut self) {}
}

struct Row {
    id: String,
    body: String,
    page: PageRef,
}

impl Component for Row {
    fn id(&self) -> &str {
        &self.id
    }

    fn markup_id(&self) -> String {
        self.id.clone()
    }

    fn output_markup_id(&self) -> bool {
        true
    }

    fn set_output_markup_id(&mut self, _output: bool) {}

    fn page(&self) -> Option<PageRef> {
        Some(Rc::clone(&self.page))
    }

    fn render_component(&mut self, cycle: &mut RequestCycle<'_>) -> Result<(), AjaxError> {
        cycle.write(&self.body);
        Ok(())
    }
}

fn make_rows(count: usize, with_brackets: bool) -> Vec<ComponentRef> {
    let page: PageRef = Rc::new(RefCell::new(NullPage));
    (0..count)
        .map(|i| {
            let cell = if with_brackets { "data[i]]>" } else { "data" };
            let body = format!(
                "<tr id=\"row{i}\"><td>{i}</td><td>{}</td></tr>",
                cell.repeat(16)
            );
            let row: ComponentRef = Rc::new(RefCell::new(Row {
                id: format!("row{i}"),
                body,
                page: Rc::clone(&page),
            }));
            row
        })
        .collect()
}

fn render_envelope(rows: &[ComponentRef]) -> usize {
    let mut target = AjaxRequestTarget::new();
    for row in rows {
        let _ = target.add_component(row);
    }
    target.prepend_javascript("Wicket.Log.info('update');");
    target.append_javascript("Wicket.Focus.requestFocus();");
    let mut response = BufferedWebResponse::new();
    {
        let mut cycle = RequestCycle::new(&mut response);
        let _ = target.respond(&mut cycle);
    }
    response.body().len()
}

fn bench_envelope_plain(c: &mut Criterion) {
    let rows = make_rows(COMPONENTS, false);
    c.bench_function("bench_envelope_plain", |b| {
        b.iter(|| black_box(render_envelope(black_box(&rows))));
    });
}

fn bench_envelope_encoded(c: &mut Criterion) {
    let rows = make_rows(COMPONENTS, true);
    c.bench_function("bench_envelope_encoded", |b| {
        b.iter(|| black_box(render_envelope(black_box(&rows))));
    });
}

criterion_group!(benches, bench_envelope_plain, bench_envelope_encoded);
criterion_main!(benches);
